use std::process::ExitCode;

use gnss_core::config::split_ascfg_defcfg;
use gnss_core::icd_defaults::{ASCFG_OVERRIDES, ICD_DEFAULTS};

use gnss_driver::bit::{dynamics_always_ok, AntennaPolicy};
use gnss_driver::driver::Driver;
use gnss_driver::link::SerialConfig;
use gnss_driver::mode::ModeOrchestrator;

fn main() -> ExitCode {
    gnss_core::logger::init();

    let Some(port) = std::env::args().nth(1) else {
        eprintln!("usage: gnss-driver <serial-port>");
        return ExitCode::FAILURE;
    };

    let (ascfg, defcfg) = split_ascfg_defcfg(ICD_DEFAULTS, ASCFG_OVERRIDES);
    let orchestrator = ModeOrchestrator::new(
        ascfg,
        defcfg,
        AntennaPolicy::RequireOkAndOn,
        dynamics_always_ok,
    );

    let config = SerialConfig::new(port);
    let mut driver = match Driver::connect(config, orchestrator) {
        Ok(driver) => driver,
        Err(err) => {
            log::error!(target: "gnss", "[main] failed to open serial link: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = driver.run_forever() {
        log::error!(target: "gnss", "[main] driver stopped: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
