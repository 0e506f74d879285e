// Regras da edição mensal de alocações, compartilhadas entre o editor e a API.
pub mod editor;
pub mod format;
pub mod months;
