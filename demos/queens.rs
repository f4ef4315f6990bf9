use clap::Parser;
use log::info;

use levelized_bdd::bdd::Bdd;
use levelized_bdd::exec_policy::{ExecPolicy, QuantifyAlgorithm};
use levelized_bdd::stats;
use levelized_bdd::types::Level;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of queens.
    #[arg(value_name = "INT", default_value = "8")]
    n: usize,

    /// Also count the solutions with the top row projected away.
    #[clap(long)]
    project: bool,
}

fn cell(n: usize, i: usize, j: usize) -> Level {
    (i * n + j) as Level
}

/// Exactly one queen in the given cells.
fn exactly_one(cells: &[Level]) -> Bdd {
    let mut res = Bdd::bdd_false();
    for &c in cells {
        let one = Bdd::cube(cells.iter().map(|&d| (d, d == c)));
        res = &res | &one;
    }
    res
}

/// At most one queen in the given cells.
fn at_most_one(cells: &[Level]) -> Bdd {
    if cells.len() < 2 {
        return Bdd::bdd_true();
    }
    let none = Bdd::cube(cells.iter().map(|&d| (d, false)));
    &none | &exactly_one(cells)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    // Encode N-queens problem:
    // - N queens on an NxN board, cell (i, j) is the level i*N+j
    // - Exactly one queen per row
    // - At most one queen per column and per diagonal
    let n = args.n;
    println!("Encoding n-queens problem with n = {}", n);

    let mut constraints: Vec<Bdd> = vec![];

    for i in 0..n {
        let row: Vec<Level> = (0..n).map(|j| cell(n, i, j)).collect();
        constraints.push(exactly_one(&row));
    }

    for j in 0..n {
        let col: Vec<Level> = (0..n).map(|i| cell(n, i, j)).collect();
        constraints.push(at_most_one(&col));
    }

    for d in 0..(2 * n - 1) {
        let diag: Vec<Level> = (0..n)
            .filter_map(|i| d.checked_sub(i).filter(|&j| j < n).map(|j| cell(n, i, j)))
            .collect();
        if diag.len() > 1 {
            constraints.push(at_most_one(&diag));
        }
        let anti: Vec<Level> = (0..n)
            .filter_map(|i| (i + n - 1).checked_sub(d).filter(|&j| j < n).map(|j| cell(n, i, j)))
            .collect();
        if anti.len() > 1 {
            constraints.push(at_most_one(&anti));
        }
    }

    println!(
        "Total {} constraints of total size {}",
        constraints.len(),
        constraints.iter().map(|c| c.nodecount()).sum::<usize>()
    );

    println!("Merging constraints...");
    let mut res = Bdd::bdd_true();
    for (k, c) in constraints.iter().enumerate() {
        res = &res & c;
        info!("after {} constraints: {} nodes, width {}", k + 1, res.nodecount(), res.width());
    }
    println!("res of size {}", res.nodecount());

    let solutions = res.satcount(n * n);
    println!("Solutions: {}", solutions);

    if args.project && n > 0 {
        let ep = ExecPolicy {
            quantify: QuantifyAlgorithm::Simultaneous,
            ..ExecPolicy::default()
        };
        let top_row = res.exists_with(&ep, |x| (x as usize) < n);
        println!(
            "Placements of the lower {} rows: {}",
            n - 1,
            top_row.satcount(n * n) / (1u32 << n.min(31))
        );
    }

    let st = stats::stats();
    println!("reduce runs: {}", st.reduce.runs);
    println!("nodes removed: {} (rule 1 ratio {:.3})", st.reduce.removed(), st.reduce.rule_1_ratio());
    println!("product sweeps: {}", st.prod.sweeps);

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
