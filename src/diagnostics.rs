use crate::runtime::BridgeError;
use miette::Report;

pub fn report_bridge_error(error: BridgeError) {
    eprintln!("{:?}", Report::new(error));
}
