//! Line-oriented JSON front end for the stock ledger.
//!
//! Reads one request object per line (stdin or a file) and writes one response
//! object per line to stdout. Blank lines and lines starting with `#` are
//! skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use stockledger_core::{Clock, SystemClock};
use stockledger_infra::{
    AdjustmentLog, BatchStore, ConsumptionMode, InventoryService, LedgerConfig, MovementLog,
    handle_json,
};

#[derive(Parser)]
#[command(name = "stockledger")]
#[command(about = "Batch-level stock ledger driven by JSON requests")]
#[command(version = "0.1.0")]
struct Cli {
    /// Request file; stdin when omitted
    input: Option<PathBuf>,

    /// Overrides STOCKLEDGER_CONSUMPTION_MODE (atomic or partial)
    #[arg(long)]
    consumption_mode: Option<String>,
}

fn main() -> anyhow::Result<()> {
    stockledger_observability::init();
    let cli = Cli::parse();

    let mut config = LedgerConfig::from_env();
    if let Some(mode) = &cli.consumption_mode {
        config.consumption_mode = mode
            .parse::<ConsumptionMode>()
            .map_err(anyhow::Error::msg)?;
    }
    tracing::info!(mode = ?config.consumption_mode, "ledger ready");

    let service = InventoryService::in_memory(config, SystemClock);

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let handled = run(&service, reader, io::stdout().lock())?;
    tracing::info!(requests = handled, "input exhausted");
    Ok(())
}

/// Answer every request in `reader`, returning how many were handled.
fn run<B, M, A, C>(
    service: &InventoryService<B, M, A, C>,
    reader: impl BufRead,
    mut writer: impl Write,
) -> anyhow::Result<usize>
where
    B: BatchStore,
    M: MovementLog,
    A: AdjustmentLog,
    C: Clock,
{
    let mut handled = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        let request = line.trim();
        if request.is_empty() || request.starts_with('#') {
            continue;
        }
        writeln!(writer, "{}", handle_json(service, request)).context("failed to write response")?;
        handled += 1;
    }
    writer.flush().context("failed to flush output")?;
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use stockledger_core::{ProductId, WarehouseId};

    #[test]
    fn answers_each_request_line_in_order() {
        let service = InventoryService::in_memory(LedgerConfig::default(), SystemClock);
        let (p, w) = (ProductId::new(), WarehouseId::new());
        let input = format!(
            concat!(
                "# seed\n",
                r#"{{"operation":"addStock","performedBy":"rx","stock":{{"productId":"{p}","warehouseId":"{w}","batchNumber":"B1","quantity":5}}}}"#,
                "\n\n",
                r#"{{"operation":"consumeStock","productId":"{p}","warehouseId":"{w}","quantity":9,"performedBy":"px"}}"#,
                "\n",
                r#"{{"operation":"getStockSummary","productId":"{p}"}}"#,
                "\n",
            ),
            p = p,
            w = w,
        );

        let mut out = Vec::new();
        let handled = run(&service, input.as_bytes(), &mut out).unwrap();
        assert_eq!(handled, 3);

        let responses: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses[0]["ok"], Value::Bool(true));
        assert_eq!(responses[1]["error"], "insufficient_stock");
        assert_eq!(responses[1]["shortfall"], 4);
        assert_eq!(responses[2]["result"][0]["totalStock"], 5);
    }
}
