use crate::build_info;
use crate::config::ProblemConfig;
use crate::error::*;
use crate::image::image2d;
use crate::initial_conditions::ClapICType;
use crate::problem::Problem;
use crate::topology::*;
use crate::vtk::write_vtk;
use clap::Parser;
use std::path::{Path, PathBuf};

/// sbpfault elastic wave solver
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Problem description in RON. Without one the reference pulse problem
    /// is solved.
    pub config: Option<PathBuf>,

    /// Directory for output files, will be created. Overrides the output
    /// directories of the configuration.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of time steps, overrides the configuration.
    #[arg(short, long)]
    pub nt: Option<usize>,

    /// Initial condition, overrides the configuration.
    #[arg(long)]
    pub ic: Option<ClapICType>,

    /// Pulse width or noise amplitude for `--ic`.
    #[arg(long, default_value = "0.005")]
    pub ic_dial: f64,

    /// Steps between snapshots, overrides the configuration.
    #[arg(short, long)]
    pub every: Option<usize>,

    /// Processes per dimension, emulated with one thread each.
    #[arg(short, long, num_args = 3, default_values_t = [1, 1, 1])]
    pub ranks: Vec<i32>,

    /// The number of rayon threads to use.
    #[arg(short, long, default_value = "8")]
    pub threads: usize,

    /// Write the effective configuration next to the outputs.
    #[arg(long, requires("output_dir"))]
    pub write_config: bool,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

impl Args {
    pub fn cli_setup(name: &str) -> Self {
        let args = Args::parse();

        if args.build_info {
            build_info::print_report(name);
            std::process::exit(0);
        }

        env_logger::init();

        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .thread_name(|i| format!("rayon_thread_{}", i))
            .build_global()
        {
            log::warn!("rayon pool already set up: {}", e);
        }

        args
    }

    /// The configuration with command line overrides applied. Creates the
    /// output directories.
    pub fn problem_config(&self) -> SolverResult<ProblemConfig> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading config: {:?}", path);
                ProblemConfig::load(path)?
            }
            None => ProblemConfig::default(),
        };
        if let Some(nt) = self.nt {
            config.nt = nt;
        }
        if let Some(ic) = self.ic {
            config.initial_condition = ic.to_ic_type(self.ic_dial);
        }
        if let Some(every) = self.every {
            config.output.every = every;
        }
        if let Some(dir) = &self.output_dir {
            config.output.vtk_dir = Some(dir.join("vtk"));
            if config.ndim == 2 {
                config.output.png_dir = Some(dir.join("png"));
            }
        }
        config.validate()?;

        for dir in [&config.output.vtk_dir, &config.output.png_dir].into_iter().flatten() {
            ensure_dir_exists(dir)?;
        }
        if self.write_config {
            if let Some(dir) = &self.output_dir {
                config.save(dir.join("config.ron"))?;
            }
        }
        Ok(config)
    }

    pub fn ranks(&self) -> crate::util::Coord3 {
        crate::util::Coord3::from_fn(|d, _| self.ranks.get(d).copied().unwrap_or(1))
    }
}

/// Create `path` unless it already is a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: &P) -> SolverResult<()> {
    let p = path.as_ref();
    if p.exists() {
        if !p.is_dir() {
            return Err(SolverError::Output(format!("not a directory {:?}", p)));
        }
        log::debug!("Exists: {:?}", p);
    } else {
        log::info!("Creating: {:?}", p);
        std::fs::create_dir_all(p)?;
    }
    Ok(())
}

/// Write the configured snapshots of the current state, tagged by `frame`.
pub fn write_outputs<T: Topology>(
    config: &ProblemConfig,
    problem: &Problem<'_, T>,
    frame: usize,
) -> SolverResult<()> {
    let rank = problem.topology().rank();
    if let Some(dir) = &config.output.vtk_dir {
        for block in problem.blocks() {
            let path = dir.join(format!("block{}_rank{}_{:04}.vtu", block.index(), rank, frame));
            write_vtk(block, problem.kernel(), problem.fields(), &path)?;
        }
    }
    if let Some(dir) = &config.output.png_dir {
        let path = dir.join(format!("frame_rank{}_{:04}.png", rank, frame));
        image2d(
            problem.fields(),
            &problem.topology().window().owned(),
            config.output.component,
            &path,
        )?;
    }
    Ok(())
}

/// Build the problem on `topology`, set its initial state and step it,
/// writing snapshots along the way. Collective.
pub fn run<T: Topology>(config: &ProblemConfig, topology: &T) -> SolverResult<f64> {
    let mut problem = Problem::new(config, topology)?;
    problem.set_initial_state(&config.initial_condition)?;
    write_outputs(config, &problem, 0)?;

    let every = config.output.every;
    problem.solve(config.nt, |p| {
        profiling::finish_frame!();
        if every > 0 && p.step_count() % every == 0 {
            write_outputs(config, p, p.step_count() / every)?;
        }
        Ok(())
    })?;
    if every == 0 || config.nt % every != 0 {
        write_outputs(config, &problem, config.nt.div_ceil(every.max(1)))?;
    }
    Ok(problem.time())
}
