use fizzbuzz_bridge::{
    diagnostics::report_bridge_error, enter, BridgeConfig, BridgeResult, Engine,
};
use inkwell::context::Context;
use std::process;

fn run(config: &BridgeConfig) -> BridgeResult<i32> {
    let context = Context::create();
    let engine = match &config.module {
        Some(path) => {
            config.log(format_args!("loading {}", path.display()));
            Engine::from_file(&context, path)?
        }
        None => {
            config.log("loading bundled fizzbuzz unit");
            Engine::bundled(&context)?
        }
    };
    config.log(format_args!(
        "linked host primitives: {}",
        engine.imported_primitives().join(", ")
    ));

    if config.emit_ir {
        eprintln!("{}", engine.ir());
    }

    let routine = engine.routine(&config.routine)?;
    config.log(format_args!("entering `{}`", config.routine));
    Ok(enter(&routine))
}

fn main() {
    let status = BridgeConfig::from_env().and_then(|config| run(&config));
    match status {
        Ok(code) => process::exit(code),
        Err(err) => {
            report_bridge_error(err);
            process::exit(1);
        }
    }
}
