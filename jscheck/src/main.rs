use std::io;
use std::process;

use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use structopt::StructOpt;

use jscheck::check::{self, Output};
use jscheck::{logger, JsCheck};

fn main() {
    let opts = JsCheck::from_args();
    if let Err(e) = logger::init(opts.log_level) {
        eprintln!("warning: cannot install logger: {e}");
    }

    let stdout = io::stdout();
    let stderr = StandardStream::stderr(ColorChoice::Auto);
    let status = check::run(
        &opts,
        &mut io::stdin().lock(),
        Output {
            out: &mut stdout.lock(),
            err: &mut stderr.lock(),
        },
    );

    process::exit(status);
}
