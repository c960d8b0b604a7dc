//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the aptos-research CLI.

use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Colors on unless `--no-color` was passed
    pub fn from_flag(no_color: bool) -> Self {
        if no_color {
            Self::no_color()
        } else {
            Self::new()
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "Aptos Research Server".bright_cyan().bold(),
                version.dimmed(),
                "parallel documentation research for Move developers".dimmed()
            );
        } else {
            println!(
                "\n   Aptos Research Server {}\n   parallel documentation research for Move developers\n",
                version
            );
        }
    }

    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Errors go to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "tip:".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "✓".green().bold(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print a finished report verbatim, framed by a rule
    pub fn report(&self, body: &str) {
        let rule = "─".repeat(60);
        if self.colored {
            println!("\n{}\n{}\n{}", rule.dimmed(), body, rule.dimmed());
        } else {
            println!("\n{}\n{}\n{}", "-".repeat(60), body, "-".repeat(60));
        }
    }

    fn table_line(values: &[&str]) -> String {
        values
            .iter()
            .map(|v| format!("{:<28}", v))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    }

    pub fn table_header(&self, columns: &[&str]) {
        let header = Self::table_line(columns);
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(columns.len() * 29).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(columns.len() * 29));
        }
    }

    pub fn table_row(&self, values: &[&str]) {
        println!("    {}", Self::table_line(values));
    }

    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flag() {
        assert!(Output::from_flag(false).colored);
        assert!(!Output::from_flag(true).colored);
        assert!(Output::default().colored);
    }

    #[test]
    fn test_table_line_pads_columns() {
        let line = Output::table_line(&["Aptos Core Research", "aptos_core_research_task"]);
        assert!(line.starts_with("Aptos Core Research "));
        assert!(line.ends_with("aptos_core_research_task"));
        assert_eq!(Output::table_line(&[]), "");
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.created("config", "aptos.toml");
            output.skipped("path", "reason");
            output.header("Test Header");
            output.subheader("Test Subheader");
            output.kv("key", "value");
            output.list_item("item");
            output.hint("hint message");
            output.command("aptos-research serve");
            output.complete("complete message");
            output.report("# Report\nbody");
            output.table_header(&["Label", "Task"]);
            output.table_row(&["a", "b"]);
            output.newline();
        }
    }
}
