//! Terminal implementation of the core console seam.

use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::ASCII_BORDERS_ONLY, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};

use spillway_core::console::{is_affirmative, Console};
use spillway_core::error::Result;
use spillway_core::types::{TransactionReview, LOVELACE_PER_ADA};

const SPINNER_TICKS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_TICK_MS: u64 = 80;
const ADDRESS_TRUNCATE_LEN: usize = 28;

pub struct OperatorConsole {
    quiet: bool,
    no_color: bool,
    spinner: Option<ProgressBar>,
}

impl OperatorConsole {
    pub fn new(quiet: bool, no_color: bool) -> Self {
        Self {
            quiet,
            no_color,
            spinner: None,
        }
    }

    fn start_spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(spinner) = &self.spinner {
            spinner.set_message(message.to_string());
            return;
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .expect("valid spinner style")
            .tick_strings(&SPINNER_TICKS);
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn success_text(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.green().to_string()
        }
    }

    fn error_text(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.red().to_string()
        }
    }

    pub fn success(&mut self, line: &str) {
        self.stop_spinner();
        println!("{}", self.success_text(line));
    }

    pub fn failure(&mut self, line: &str) {
        self.stop_spinner();
        eprintln!("{}", self.error_text(line));
    }

    /// Cancellations get a plain line; they are decisions, not defects.
    pub fn notice(&mut self, line: &str) {
        self.stop_spinner();
        println!("{line}");
    }

    fn truncate(value: &str, max_len: usize) -> String {
        let mut chars = value.chars();
        let truncated: String = chars.by_ref().take(max_len).collect();
        if chars.next().is_some() {
            format!("{truncated}...")
        } else {
            truncated
        }
    }

    fn format_ada(lovelace: u64) -> String {
        let whole = lovelace / LOVELACE_PER_ADA;
        let frac = lovelace % LOVELACE_PER_ADA;
        format!("{whole}.{frac:06}")
    }

    fn render_review(review: &TransactionReview) -> String {
        let mut table = Table::new();
        table
            .load_preset(ASCII_BORDERS_ONLY)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["#", "Address", "Asset", "Quantity", "ADA"]);
        for (index, output) in review.outputs.iter().enumerate() {
            table.add_row(vec![
                (index + 1).to_string(),
                Self::truncate(&output.address, ADDRESS_TRUNCATE_LEN),
                Self::truncate(&output.asset, 20),
                output.asset_quantity.to_string(),
                Self::format_ada(output.coin),
            ]);
        }

        format!(
            "Signed transaction {id} ({network}, {size} bytes)\n{table}\n\
             fee: {fee} ADA, change to {change_addr}: {change} ADA",
            id = review.id,
            network = review.network,
            size = review.size_bytes,
            fee = Self::format_ada(review.fee),
            change_addr = Self::truncate(&review.change_address, ADDRESS_TRUNCATE_LEN),
            change = Self::format_ada(review.change_coin),
        )
    }
}

impl Console for OperatorConsole {
    fn info(&mut self, line: &str) {
        self.stop_spinner();
        if !self.quiet {
            println!("{line}");
        }
    }

    fn progress(&mut self, message: &str) {
        self.start_spinner(message);
    }

    fn review_transaction(&mut self, review: &TransactionReview) {
        self.stop_spinner();
        println!("{}", Self::render_review(review));
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.stop_spinner();
        print!("{prompt} (y/N)? ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(is_affirmative(&input))
    }
}

#[cfg(test)]
mod tests {
    use spillway_core::types::{Network, OutputReview, TransactionReview};

    use super::OperatorConsole;

    fn review(outputs: usize) -> TransactionReview {
        TransactionReview {
            id: "ab".repeat(32),
            network: Network::Testnet,
            fee: 171_573,
            size_bytes: 312,
            change_address: "addr_test1vabcdefabcdefabcdefabcdefabcdef".to_string(),
            change_coin: 96_000_000,
            outputs: (0..outputs)
                .map(|i| OutputReview {
                    address: format!("addr_test1v{i:0>33}"),
                    coin: 1_344_798,
                    asset_quantity: (i as u64 + 1) * 5,
                    asset: format!("{}.544f4b454e", "cd".repeat(28)),
                })
                .collect(),
        }
    }

    #[test]
    fn formats_ada_with_six_decimals() {
        assert_eq!(OperatorConsole::format_ada(0), "0.000000");
        assert_eq!(OperatorConsole::format_ada(1), "0.000001");
        assert_eq!(OperatorConsole::format_ada(1_344_798), "1.344798");
        assert_eq!(OperatorConsole::format_ada(42_000_000), "42.000000");
    }

    #[test]
    fn truncates_long_values_with_ellipsis() {
        assert_eq!(OperatorConsole::truncate("short", 10), "short");
        assert_eq!(
            OperatorConsole::truncate("0123456789abcdef", 10),
            "0123456789..."
        );
    }

    #[test]
    fn review_rendering_contains_every_output_row() {
        for size in [1_usize, 10, 100] {
            let rendered = OperatorConsole::render_review(&review(size));
            assert!(rendered.contains("Quantity"));
            assert!(rendered.contains("fee: 0.171573"));
            assert!(rendered.contains(&size.to_string()));
        }
    }
}
