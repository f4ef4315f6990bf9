use clap::Parser;
use log::info;

use levelized_bdd::bdd::Bdd;
use levelized_bdd::stats;
use levelized_bdd::types::Level;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of counter bits.
    #[arg(value_name = "INT", default_value = "10")]
    bits: usize,

    /// Initial value of the counter.
    #[clap(long, value_name = "INT", default_value = "0")]
    init: u64,

    /// Count by two instead of one, so only half of the values are reachable.
    #[clap(long)]
    even: bool,
}

/// Bit `i` of the current state is on level `2i`, its next-state copy on level `2i+1`.
fn current(i: usize) -> Level {
    (2 * i) as Level
}

fn next(i: usize) -> Level {
    (2 * i + 1) as Level
}

fn state(bits: usize, value: u64) -> Bdd {
    Bdd::cube((0..bits).map(|i| (current(i), (value >> i) & 1 == 1)))
}

/// Transition relation of `x' = x + 2^shift (mod 2^bits)`.
fn increment(bits: usize, shift: usize) -> Bdd {
    let mut relation = Bdd::bdd_true();
    let mut carry = Bdd::bdd_true();
    for i in 0..bits {
        let x = Bdd::ithvar(current(i));
        let x_next = Bdd::ithvar(next(i));
        if i < shift {
            // Bits below the shift are kept as-is
            relation = &relation & &x_next.apply_eq(&x);
            continue;
        }
        relation = &relation & &x_next.apply_eq(&(&x ^ &carry));
        carry = &x & &carry;
    }
    relation
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

    let bits = args.bits;
    let relation = increment(bits, if args.even { 1 } else { 0 });
    println!("relation of size {}", relation.nodecount());

    let init = state(bits, args.init);
    let mut reachable = init.clone();
    let mut frontier = init.clone();
    let mut steps = 0;
    while !frontier.is_false() {
        let image = frontier.relnext_interleaved(&relation);
        frontier = image.apply_diff(&reachable);
        reachable = &reachable | &frontier;
        steps += 1;
        info!(
            "step {}: frontier of size {}, reachable of size {}",
            steps,
            frontier.nodecount(),
            reachable.nodecount()
        );
    }

    // Next-state levels are not in the support, so every state is counted 2^bits times
    let count = reachable.satcount(2 * bits) >> bits;
    println!("Fixpoint after {} steps: {} reachable states", steps, count);

    // Backward check: every reachable state other than the initial one has a reachable predecessor
    let predecessors = reachable.relprev_interleaved(&relation)?;
    let unexplained = reachable.apply_diff(&predecessors.apply_and(&reachable).relnext_interleaved(&relation));
    println!(
        "States without a reachable predecessor: {}",
        unexplained.satcount(2 * bits) >> bits
    );

    let st = stats::stats();
    println!("reduce runs: {}", st.reduce.runs);
    println!("quantify sweeps: {}", st.quantify.singleton_sweeps + st.quantify.simultaneous_sweeps);
    println!("zero-cost replacements: {}", st.replace.zero_cost());

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
