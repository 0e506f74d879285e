// src/allocation/editor.rs

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::allocation::{
    format::{format_number_with_commas, parse_formatted_number},
    months::{fiscal_year_months, months_between, Month},
};

pub const MONTH_NOT_IN_VIEW: &str = "Month is not available for allocation in current view";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("Month is not available for allocation in current view: {0}")]
    MonthNotInView(Month),

    #[error("Allocation for {0} cannot be negative")]
    NegativeAmount(Month),
}

/// Modo de visualização do editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    FiscalYear(i32),
    ProjectDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewModeKind {
    FiscalYear,
    ProjectDuration,
}

/// Janela nominal do projeto (mês inicial e mês de fechamento previsto).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectWindow {
    pub start: Month,
    pub end: Month,
}

/// Meses exibidos para um modo de visualização. É esse conjunto, e não a janela
/// nominal do projeto, que delimita o que pode ser editado.
pub fn displayed_months(mode: ViewMode, window: ProjectWindow, fiscal_start_month: u32) -> Vec<Month> {
    match mode {
        ViewMode::FiscalYear(year) => fiscal_year_months(year, fiscal_start_month),
        ViewMode::ProjectDuration => months_between(window.start, window.end),
    }
}

/// Rejeita qualquer mês fora do conjunto exibido.
pub fn validate_bulk_update<I>(displayed: &[Month], requested: I) -> Result<(), AllocationError>
where
    I: IntoIterator<Item = Month>,
{
    match requested.into_iter().find(|m| !displayed.contains(m)) {
        Some(month) => Err(AllocationError::MonthNotInView(month)),
        None => Ok(()),
    }
}

/// Estado de edição da distribuição mensal de um projeto.
///
/// `allocations` guarda os valores confirmados; `inputs` guarda o texto cru que o
/// usuário está digitando, até o blur.
#[derive(Debug, Clone)]
pub struct AllocationEditor {
    window: ProjectWindow,
    fiscal_start_month: u32,
    view_mode: ViewMode,
    allocations: BTreeMap<Month, f64>,
    inputs: HashMap<Month, String>,
}

impl AllocationEditor {
    pub fn new(
        window: ProjectWindow,
        fiscal_start_month: u32,
        view_mode: ViewMode,
        allocations: BTreeMap<Month, f64>,
    ) -> Self {
        Self {
            window,
            fiscal_start_month,
            view_mode,
            allocations,
            inputs: HashMap::new(),
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn displayed_months(&self) -> Vec<Month> {
        displayed_months(self.view_mode, self.window, self.fiscal_start_month)
    }

    /// Troca o modo de visualização. Entradas não confirmadas são descartadas para
    /// que texto cru de um conjunto de meses não vaze para outro.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.inputs.clear();
    }

    pub fn input(&mut self, month: Month, raw: impl Into<String>) {
        self.inputs.insert(month, raw.into());
    }

    /// Confirma o texto digitado para `month`: converte, guarda e devolve o valor.
    pub fn blur(&mut self, month: Month) -> f64 {
        let value = match self.inputs.remove(&month) {
            Some(raw) => parse_formatted_number(&raw),
            None => return self.committed(month),
        };
        self.allocations.insert(month, value);
        value
    }

    pub fn committed(&self, month: Month) -> f64 {
        self.allocations.get(&month).copied().unwrap_or(0.0)
    }

    /// Texto exibido no campo: o texto cru enquanto editado, senão o valor formatado.
    pub fn display_value(&self, month: Month) -> String {
        match self.inputs.get(&month) {
            Some(raw) => raw.clone(),
            None => format_number_with_commas(self.committed(month)),
        }
    }

    pub fn has_pending_input(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn allocations(&self) -> &BTreeMap<Month, f64> {
        &self.allocations
    }

    /// Aplica várias alocações de uma vez, tudo ou nada.
    pub fn apply_bulk_update(&mut self, updates: &[(Month, f64)]) -> Result<(), AllocationError> {
        let displayed = self.displayed_months();
        validate_bulk_update(&displayed, updates.iter().map(|(m, _)| *m))?;
        if let Some((month, _)) = updates.iter().find(|(_, v)| *v < 0.0) {
            return Err(AllocationError::NegativeAmount(*month));
        }

        for (month, value) in updates {
            self.inputs.remove(month);
            self.allocations.insert(*month, *value);
        }
        Ok(())
    }

    /// Soma dos valores confirmados nos meses exibidos.
    pub fn displayed_total(&self) -> f64 {
        self.displayed_months().iter().map(|m| self.committed(*m)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    fn editor(mode: ViewMode) -> AllocationEditor {
        // Projeto nominalmente de mar/2025 a jun/2025
        let window = ProjectWindow { start: m(2025, 3), end: m(2025, 6) };
        AllocationEditor::new(window, 1, mode, BTreeMap::new())
    }

    #[test]
    fn blur_parses_and_reformats_input() {
        let mut ed = editor(ViewMode::ProjectDuration);
        ed.input(m(2025, 4), "1250000");
        assert_eq!(ed.display_value(m(2025, 4)), "1250000");

        assert_eq!(ed.blur(m(2025, 4)), 1_250_000.0);
        assert_eq!(ed.display_value(m(2025, 4)), "1,250,000");
        assert!(!ed.has_pending_input());
    }

    #[test]
    fn blur_with_garbage_commits_zero() {
        let mut ed = editor(ViewMode::ProjectDuration);
        ed.input(m(2025, 3), "abc");
        assert_eq!(ed.blur(m(2025, 3)), 0.0);
        assert_eq!(ed.display_value(m(2025, 3)), "0");
    }

    #[test]
    fn month_outside_displayed_set_is_rejected() {
        let mut ed = editor(ViewMode::ProjectDuration);
        let err = ed.apply_bulk_update(&[(m(2025, 9), 10.0)]).unwrap_err();
        assert_eq!(err, AllocationError::MonthNotInView(m(2025, 9)));
        assert!(err.to_string().starts_with(MONTH_NOT_IN_VIEW));
        assert!(ed.allocations().is_empty());
    }

    #[test]
    fn month_in_view_is_accepted_regardless_of_project_dates() {
        // Setembro está fora da janela nominal, mas aparece no ano fiscal exibido
        let mut ed = editor(ViewMode::FiscalYear(2025));
        ed.apply_bulk_update(&[(m(2025, 9), 5_000.0), (m(2025, 4), 1_000.0)])
            .unwrap();
        assert_eq!(ed.committed(m(2025, 9)), 5_000.0);
        assert_eq!(ed.displayed_total(), 6_000.0);
    }

    #[test]
    fn bulk_update_is_all_or_nothing() {
        let mut ed = editor(ViewMode::ProjectDuration);
        let result = ed.apply_bulk_update(&[(m(2025, 4), 1.0), (m(2026, 1), 2.0)]);
        assert!(result.is_err());
        assert!(ed.allocations().is_empty());

        let negative = ed.apply_bulk_update(&[(m(2025, 4), -1.0)]);
        assert_eq!(negative, Err(AllocationError::NegativeAmount(m(2025, 4))));
    }

    #[test]
    fn switching_view_mode_clears_transient_input_only() {
        let mut ed = editor(ViewMode::FiscalYear(2025));
        ed.input(m(2025, 5), "2,000");
        ed.blur(m(2025, 5));
        ed.input(m(2025, 6), "3000");
        assert!(ed.has_pending_input());

        ed.set_view_mode(ViewMode::ProjectDuration);

        assert!(!ed.has_pending_input());
        assert_eq!(ed.view_mode(), ViewMode::ProjectDuration);
        assert_eq!(ed.committed(m(2025, 5)), 2_000.0);
        assert_eq!(ed.display_value(m(2025, 5)), "2,000");
        // O texto "3000" nunca foi confirmado
        assert_eq!(ed.display_value(m(2025, 6)), "0");
    }

    #[test]
    fn displayed_months_follow_view_mode() {
        let window = ProjectWindow { start: m(2025, 3), end: m(2025, 6) };
        assert_eq!(displayed_months(ViewMode::ProjectDuration, window, 1).len(), 4);
        let fy = displayed_months(ViewMode::FiscalYear(2026), window, 7);
        assert_eq!(fy.first(), Some(&m(2025, 7)));
        assert_eq!(fy.last(), Some(&m(2026, 6)));
    }
}
