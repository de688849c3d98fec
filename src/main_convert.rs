// One-shot 3D asset conversion: configure render devices, import one asset,
// export one GLB, exit.

use med_assist::convert::config::ConvertConfig;
use med_assist::convert::devices::DeviceSelection;
use med_assist::convert::host::BridgeHost;
use med_assist::convert::job::{self, ConversionJob};
use med_assist::log_error;

fn main() {
    let config = ConvertConfig::load();
    println!(
        "Converting {} -> {}",
        config.input_file, config.output_file
    );

    let conversion = match ConversionJob::from_config(&config) {
        Ok(conversion) => conversion,
        Err(e) => {
            println!("Error: {e}");
            log_error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut host = BridgeHost::new(&config.tool_bin, &config.driver_script);

    match job::run(&conversion, &mut host) {
        Ok(DeviceSelection::Configured { enabled }) => {
            println!(
                "Conversion complete ({} accelerator device(s) enabled)",
                enabled.len()
            );
        }
        Ok(DeviceSelection::SoftwareFallback { reason }) => {
            println!("Conversion complete (software rendering: {reason})");
        }
        Err(e) => {
            println!("Error: {e}");
            log_error!("{}", e);
            std::process::exit(1);
        }
    }
}
