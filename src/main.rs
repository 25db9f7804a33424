use bucket_td::bucket_elimination::BucketEliminationDecomposer;
use bucket_td::context::Context;
use bucket_td::graph::{BaseGraph, HyperedgeGraph, Hypergraph};
use bucket_td::heuristic_elimination_order::OrderingAlgorithmType;
use bucket_td::io::{PaceReader, PaceWriter};
use bucket_td::manipulation::{
    JoinNodeReplacement, LimitMaximumForgottenVertexCount, LimitMaximumIntroducedVertexCount,
    ManipulationOperation, WidthReduction,
};
use bucket_td::solver::IterativeImprovement;
use bucket_td::timeout::spawn_timeout;
use std::convert::TryFrom;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{stdin, stdout, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use structopt::StructOpt;

#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "bucket-td-cli",
    about = "Computes tree decompositions of (hyper)graphs via bucket elimination."
)]
struct Opt {
    /// Input file, using the graph format of the PACE challenge. Lines with more than two
    /// vertices are read as hyperedges. `stdin` if not specified.
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,

    /// Output file for the decomposition in `.td` format. `stdout` if not specified.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Number of decompositions to compute. 0 runs until the timeout or ctrl-c.
    #[structopt(short, long, default_value = "10")]
    iterations: usize,

    /// Stop after this many decompositions without improvement.
    #[structopt(long)]
    non_improvement_limit: Option<usize>,

    /// Seed for the random number generator.
    #[structopt(short, long)]
    seed: Option<u64>,

    /// Time limit in seconds.
    #[structopt(short, long)]
    timeout: Option<u64>,

    /// Use min-degree instead of min-fill orderings.
    #[structopt(long)]
    min_degree: bool,

    /// Apply width reduction to the largest bags.
    #[structopt(short, long)]
    width_reduction: bool,

    /// Let width reduction process all bags instead of only the largest ones.
    #[structopt(long)]
    all_bags: bool,

    /// Replace join nodes with more than two children by binary joins.
    #[structopt(short, long)]
    join_replacement: bool,

    /// Maximum number of vertices forgotten by a single node.
    #[structopt(long)]
    limit_forgotten: Option<usize>,

    /// Maximum number of vertices introduced by a single node.
    #[structopt(long)]
    limit_introduced: Option<usize>,

    /// Verbosity, repeat for more output.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

impl Opt {
    fn decomposer(&self) -> BucketEliminationDecomposer {
        let ordering = if self.min_degree {
            OrderingAlgorithmType::MinDegree
        } else {
            OrderingAlgorithmType::MinFill
        };
        let mut decomposer = BucketEliminationDecomposer::new().ordering(ordering);
        if self.width_reduction || self.all_bags {
            decomposer = decomposer.with_operation(ManipulationOperation::Structural(Box::new(
                WidthReduction::new().restricted_to_largest_bags(!self.all_bags),
            )));
        }
        if self.join_replacement {
            decomposer = decomposer
                .with_operation(ManipulationOperation::Structural(Box::new(JoinNodeReplacement)));
        }
        if let Some(limit) = self.limit_forgotten {
            decomposer = decomposer.with_operation(ManipulationOperation::Structural(Box::new(
                LimitMaximumForgottenVertexCount::new(limit),
            )));
        }
        if let Some(limit) = self.limit_introduced {
            decomposer = decomposer.with_operation(ManipulationOperation::Structural(Box::new(
                LimitMaximumIntroducedVertexCount::new(limit),
            )));
        }
        decomposer
    }
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();
    if opt.limit_forgotten == Some(0) || opt.limit_introduced == Some(0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "vertex count limits must be positive",
        ));
    }

    #[cfg(feature = "pace-logging")]
    bucket_td::logger::build_logger_for_level(bucket_td::logger::level_for_verbosity(
        opt.verbose,
    ));

    let ctx = Arc::new(Context::new());
    #[cfg(feature = "handle-ctrlc")]
    bucket_td::signals::initialize(Arc::clone(&ctx))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    if let Some(seconds) = opt.timeout {
        spawn_timeout(Arc::clone(&ctx), Duration::from_secs(seconds))?;
    }

    let graph: Hypergraph = match &opt.input {
        Some(path) => {
            let file = File::open(path)?;
            Hypergraph::try_from(PaceReader(BufReader::new(file)))?
        }
        None => {
            let stdin = stdin();
            let reader = PaceReader(stdin.lock());
            Hypergraph::try_from(reader)?
        }
    };
    println!(
        "c Read graph with {} vertices and {} hyperedges.",
        graph.order(),
        graph.hyperedge_count()
    );

    let td = IterativeImprovement::new(opt.decomposer())
        .iteration_count(opt.iterations)
        .non_improvement_limit(opt.non_improvement_limit)
        .seed(opt.seed)
        .compute(&graph, &ctx)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let td = match td {
        Some(td) => td,
        None => {
            println!("c No decomposition computed before termination.");
            return Ok(());
        }
    };
    println!("c width = {}", td.width());
    println!("c nodes = {}", td.node_count());
    match td.verify(&graph) {
        Ok(()) => println!("c valid = true"),
        Err(e) => println!("c valid = false ({})", e),
    }

    match opt.output {
        Some(path) => {
            let writer = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?;
            PaceWriter::new(&td, &graph, writer).output()
        }
        None => {
            let writer = stdout();
            PaceWriter::new(&td, &graph, writer.lock()).output()
        }
    }
}
