extern crate clap;
extern crate spinred;

use std::process;
use spinred::conf::Conf;
use spinred::eigendecompositor::{Quantity, Results};
use spinred::group::algebra::GroupRegistry;

fn print_levels(results: &Results, num_levels: usize) -> Result<(), spinred::error::Error> {
    let energy = results.spectrum(Quantity::Energy)?;
    let others: Vec<Quantity> = results.quantities()
        .filter(|&q| q != Quantity::Energy)
        .collect();
    let mut rows = Vec::new();
    for (b, block) in energy.blocks.iter().enumerate() {
        for (i, &e) in block.values.iter().enumerate() {
            rows.push((e, b, i));
        }
    }
    rows.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));
    let ground = rows.first().map(|r| r.0).unwrap_or(0.0);
    println!("ground_energy: {}", ground);
    println!("levels:");
    for &(e, b, i) in rows.iter().take(num_levels) {
        let block = &energy.blocks[b];
        print!("  - {{energy: {}, relative: {}, block: {}, degeneracy: {}, weight: {}",
               e, e - ground, b, block.degeneracy, block.weights[i]);
        if let Some(properties) = results.block_properties().get(b) {
            print!(", properties: {}", properties);
        }
        for &q in &others {
            let value = results.spectrum(q)?.blocks[b].values[i];
            print!(", {}: {}", q, value);
        }
        for &(q, ref p) in results.derivative_keys() {
            let value = results.derivative(q, p)?.blocks[b].values[i];
            print!(", d{}/d{}: {}", q, p, value);
        }
        println!("}}");
    }
    Ok(())
}

fn run() -> Result<(), spinred::error::Error> {
    let matches = clap::App::new(env!("CARGO_PKG_NAME"))
        .args_from_usage("--conf=<conf> 'YAML file describing the spin system'")
        .args_from_usage("[--levels=<levels>] 'Number of lowest levels to print'")
        .args_from_usage("[--print-space] 'Print the block structure of the reduced basis'")
        .get_matches();

    let path = matches.value_of("conf").unwrap_or_default();
    println!("conf: {}", path);
    let num_levels = match matches.value_of("levels") {
        Some(s) => s.parse().map_err(|_| {
            spinred::error::Error::Conf(format!("invalid number of levels: {}", s))
        })?,
        None => 10,
    };
    let conf = Conf::load(path)?;
    println!("multiplicities: {:?}", conf.multiplicities);
    println!("basis: {:?}", conf.basis);

    let registry = GroupRegistry::new();
    let mut run = conf.make_run(&registry)?;
    {
        let space = run.space()?;
        println!("blocks: {}", space.len());
        println!("largest_block: {}", space.max_block_size());
        if matches.is_present("print-space") {
            println!("space:");
            for block in &space.blocks {
                println!("  - {{size: {}, properties: {}}}", block.size(), block.properties);
            }
        }
    }
    let results = run.do_run()?;
    print_levels(results, num_levels)
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
