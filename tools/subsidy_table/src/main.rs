use clap::Parser;
use consensus_core::config::subsidy::SUBSIDY_BY_MONTH_TABLE;
use std::process;
use tracing::{debug, error, info};

/// Generates the monthly deflationary subsidy table, or checks the built-in one.
#[derive(Parser, Debug)]
#[command(name = "subsidy_table")]
#[command(about = "Generate or verify the deflationary subsidy table", long_about = None)]
struct Args {
    /// Subsidy of the first deflationary month, in sompi
    #[arg(long, default_value_t = 1_000_000_000u64)]
    base_subsidy: u64,

    /// Months between two halvings of the subsidy
    #[arg(long, default_value_t = 12u64)]
    months_per_halving: u64,

    /// Compare the generated table with the built-in one and exit non-zero on mismatch
    #[arg(long)]
    check: bool,

    /// Values per printed row
    #[arg(long, default_value_t = 10usize)]
    columns: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// `floor(base / 2^(month / months_per_halving))` in double precision, up to and including the first zero
fn generate_table(base_subsidy: u64, months_per_halving: u64) -> Vec<u64> {
    let mut table = Vec::new();
    let mut month = 0u64;
    loop {
        let exponent = month as f64 / months_per_halving as f64;
        let subsidy = (base_subsidy as f64 / 2f64.powf(exponent)).floor() as u64;
        table.push(subsidy);
        if subsidy == 0 {
            return table;
        }
        month += 1;
    }
}

/// First month where the two tables differ, counting a length difference as a mismatch
fn first_mismatch(generated: &[u64], builtin: &[u64]) -> Option<usize> {
    generated
        .iter()
        .zip(builtin.iter())
        .position(|(a, b)| a != b)
        .or_else(|| (generated.len() != builtin.len()).then(|| generated.len().min(builtin.len())))
}

fn format_table(table: &[u64], columns: usize) -> String {
    let mut out = format!("pub const SUBSIDY_BY_MONTH_TABLE: [u64; {}] = [\n", table.len());
    for row in table.chunks(columns.max(1)) {
        let values: Vec<String> = row.iter().map(u64::to_string).collect();
        out.push_str("    ");
        out.push_str(&values.join(", "));
        out.push_str(",\n");
    }
    out.push_str("];");
    out
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    if args.months_per_halving == 0 {
        error!("months per halving must be positive");
        process::exit(2);
    }

    let table = generate_table(args.base_subsidy, args.months_per_halving);
    debug!("Generated {} months starting at {}", table.len(), args.base_subsidy);

    if args.check {
        match first_mismatch(&table, &SUBSIDY_BY_MONTH_TABLE) {
            None => info!("Built-in subsidy table matches ({} months)", table.len()),
            Some(month) => {
                error!(
                    "Built-in subsidy table differs at month {}: generated {:?}, built-in {:?}",
                    month,
                    table.get(month),
                    SUBSIDY_BY_MONTH_TABLE.get(month)
                );
                process::exit(1);
            }
        }
        return;
    }

    println!("{}", format_table(&table, args.columns));
}

fn init_logging(args: &Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_table_matches_builtin() {
        let table = generate_table(1_000_000_000, 12);
        assert_eq!(table.len(), 360);
        assert_eq!(table.last(), Some(&0));
        assert_eq!(first_mismatch(&table, &SUBSIDY_BY_MONTH_TABLE), None);
    }

    #[test]
    fn test_other_schedules_are_reported() {
        let table = generate_table(1_000_000_000, 6);
        assert_eq!(table[6], 500_000_000);
        assert_eq!(first_mismatch(&table, &SUBSIDY_BY_MONTH_TABLE), Some(1));
        assert_eq!(first_mismatch(&[3, 2], &[3, 2, 0]), Some(2));
        assert_eq!(generate_table(1, 12), vec![1, 0]);
    }

    #[test]
    fn test_format_table_rows() {
        assert_eq!(format_table(&[4, 2, 1, 0], 3), "pub const SUBSIDY_BY_MONTH_TABLE: [u64; 4] = [\n    4, 2, 1,\n    0,\n];");
    }
}
