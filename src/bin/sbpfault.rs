use sbpfault::cli::*;
use sbpfault::topology::*;

fn main() {
    let args = Args::cli_setup("sbpfault");

    let config = match args.problem_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let ranks = args.ranks();
    if ranks.iter().product::<i32>() == 1 {
        let topology = SerialTopology::new(config.global_nx());
        match run(&config, &topology) {
            Ok(t) => log::info!("done, t = {:e}", t),
            Err(e) => topology.abort(&e),
        }
        return;
    }

    let ghost = match config.sbp() {
        Ok(sbp) => sbp.ghost_width(),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let result = ThreadedCartesian::run(config.global_nx(), ranks, ghost, |topology| {
        if let Err(e) = run(&config, &topology) {
            topology.abort(&e);
        }
    });
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
