//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Color for a condition status ("True", "False", "Progressing", "Unknown")
    pub fn get_condition_color(&self, status: &str) -> TableColor {
        match status {
            "True" => self.success,
            "False" => self.error,
            "Progressing" => self.warning,
            _ => self.muted,
        }
    }

    /// Color for a last-operation state
    pub fn get_operation_color(&self, state: &str) -> TableColor {
        match state {
            "Succeeded" => self.success,
            "Processing" | "Pending" => self.warning,
            "Error" | "Failed" | "Aborted" => self.error,
            _ => self.muted,
        }
    }

    /// Color for a cloud profile classification
    pub fn get_classification_color(&self, classification: &str) -> TableColor {
        match classification {
            "supported" => self.success,
            "preview" => self.info,
            "deprecated" => self.warning,
            _ => self.muted,
        }
    }
}

/// Convert comfy_table::Color to colored::Color string representation
pub fn table_color_to_colored_str(color: TableColor) -> &'static str {
    match color {
        TableColor::Green => "green",
        TableColor::Yellow => "yellow",
        TableColor::Red => "red",
        TableColor::Cyan => "cyan",
        TableColor::DarkGrey => "bright black",
        _ => "white",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_condition_and_operation_colors() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_condition_color("True"), TableColor::Green);
        assert_eq!(theme.get_condition_color("Progressing"), TableColor::Yellow);
        assert_eq!(theme.get_condition_color("False"), TableColor::Red);
        assert_eq!(theme.get_condition_color("Unknown"), TableColor::DarkGrey);
        assert_eq!(theme.get_operation_color("Processing"), TableColor::Yellow);
        assert_eq!(theme.get_classification_color("deprecated"), TableColor::Yellow);
        assert_eq!(table_color_to_colored_str(theme.muted), "bright black");
    }
}
