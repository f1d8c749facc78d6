use super::ui;
use crate::core::{BASE_CURRENCY, ConversionResult};
use crate::handler::{ConversionHandler, ProxyEvent, ProxyResponse};
use anyhow::Result;
use comfy_table::Cell;
use tracing::debug;

impl ConversionResult {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Amount")]);

        for (code, amount) in self.iter() {
            table.add_row(vec![Cell::new(code), ui::amount_cell(amount)]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text(&format!("{BASE_CURRENCY} conversion"), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output
    }
}

/// Resolves once Ctrl-C is pressed. Never resolves if the signal cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    debug!("Interrupted");
}

/// Runs a single conversion from the terminal.
pub async fn run(handler: &ConversionHandler, usd_amount: &str, as_json: bool) -> Result<()> {
    let event = ProxyEvent::with_usd_amount(usd_amount);

    let spinner = ui::new_spinner("Fetching exchange rates...");
    let result = handler.run_until(&event, interrupted()).await;
    spinner.finish_and_clear();

    if as_json {
        let response = ProxyResponse::from_result(&result);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        match &result {
            Ok(amounts) => println!("{}", amounts.display_as_table()),
            Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
        }
        println!(
            "\n{}",
            ui::style_text(
                &format!("Targets: {}", handler.targets().join(", ")),
                ui::StyleType::Subtle
            )
        );
    }

    result.map(|_| ()).map_err(anyhow::Error::from)
}
