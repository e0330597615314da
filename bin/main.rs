use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use qarray::{
    Error, FlagMap, ResourceParams, SubmitRequest, batch, derive_job_name, derive_resource_flags,
};

/// Submit a batch file of shell commands as an SGE job array.
///
/// Reads one command per non-empty line and prints the qsub invocation,
/// with an inline task-dispatch script, on stdout. Pipe it to `sh` to
/// submit for real.
#[derive(clap::Parser)]
#[command(author, version, about)]
struct Args {
    /// Memory to request per process, in gigabytes.
    #[arg(short = 'm', long, default_value_t = 4.0)]
    mem_gb: f32,

    /// Threads per process. Requests a parallel environment when >= 2;
    /// the memory request is split across the threads.
    #[arg(short = 't', long)]
    threads: Option<u32>,

    /// Extra comma-separated resource list appended to -l,
    /// e.g. "oracle=1,h_rt=8:0:0".
    #[arg(short = 'l', long)]
    resources: Option<String>,

    /// Extra scheduler options, e.g. "-P myproject -q all.q".
    ///
    /// The shorthand SL6 expands to "-P SL6 -q low6.q".
    #[arg(short = 'O', long)]
    options: Option<String>,

    /// Job name. Derived from the batch file name when absent.
    #[arg(short = 'N', long)]
    name: Option<String>,

    /// Discard job stdout and stderr.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Environment module to load before each task. May be repeated.
    #[arg(long = "module")]
    modules: Vec<String>,

    /// Wait for these predecessor jobs to finish first (-hold_jid).
    #[arg(long)]
    hold: Option<String>,

    /// Number of batch-file lines to run per array task.
    #[arg(short = 'b', long, default_value_t = 1)]
    bundle: usize,

    /// Limit on concurrently running array tasks (-tc).
    #[arg(short = 'c', long)]
    max_concurrent: Option<u32>,

    // Positional
    /// Batch file with one shell command per line.
    batch_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("qarray: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> qarray::Result<()> {
    let tasks = batch::read_tasks(&args.batch_file)?;
    if tasks.is_empty() {
        return Err(Error::EmptyBatch(args.batch_file.display().to_string()));
    }
    let tasks = batch::bundle(&tasks, args.bundle);

    let parsed = match args.options.as_deref() {
        Some(raw) => FlagMap::parse(raw)?,
        None => FlagMap::new(),
    };
    debug!("parsed extra options: {parsed}");

    let params = ResourceParams {
        mem_gb: args.mem_gb,
        threads: args.threads,
        extra_resources: args.resources.clone(),
        quiet: args.quiet,
        name: args.name.clone(),
        batch_file: args.batch_file.clone(),
    };
    let flags = derive_resource_flags(parsed, &params);

    let mut name = derive_job_name(&params);
    if name.is_empty() {
        name = format!("job{}", std::process::id());
    }
    info!(
        "job array \"{name}\": {} tasks, flags: {flags}",
        tasks.len()
    );

    let request = SubmitRequest {
        name,
        flags,
        tasks,
        modules: args.modules.clone(),
        hold: args.hold.clone(),
        max_concurrent: args.max_concurrent,
    };
    print!("{}", request.render());
    Ok(())
}
