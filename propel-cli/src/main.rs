use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Error};
use clap::{value_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info, Level, LevelFilter, Record};

use propel::config::Config;
use propel::expr::ExprParser;
use propel::lower::{lower, var_name, wrap_top_level};
use propel::simplify::simplify;
use propel::word;
use propel::{Problem, Solver};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "{}", record.args())
        } else {
            writeln!(buf, "{}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("PROPEL_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("propel")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg(
            Arg::from_usage("[width] -w --width=[BITS] 'Bit width of integer variables'")
                .default_value("9"),
        )
        .arg(
            Arg::from_usage(
                "[max-solutions] --max-solutions=[N] 'Maximum number of solutions per problem'",
            )
            .default_value("100"),
        )
        .get_matches();

    init_logging();

    let config = Config {
        word_width: value_t!(matches, "width", usize)?,
        max_solutions: value_t!(matches, "max-solutions", usize)?,
        ..Config::default()
    };

    let mut source = String::new();
    match matches.value_of("INPUT") {
        Some(path) => {
            info!("reading file '{}'", path);
            fs::File::open(path)
                .with_context(|| format!("failed to open file {}", path))?
                .read_to_string(&mut source)?;
        }
        None => {
            info!("reading from stdin");
            io::stdin().lock().read_to_string(&mut source)?;
        }
    }

    let mut parser = ExprParser::new(&source);
    loop {
        let expr = match parser.parse() {
            Ok(None) => {
                info!("end of input");
                break;
            }
            Ok(Some(expr)) => expr,
            Err(err) => {
                error!("{}", err);
                continue;
            }
        };

        let expr = wrap_top_level(expr);
        println!("{}", expr);

        let mut problem = Problem::new(&config);
        let top = match lower(&expr, &mut problem) {
            Ok(top) => top,
            Err(err) => {
                error!("invalid expression: {}", err);
                continue;
            }
        };

        let (problem, _top) = simplify(&problem, &top);

        let mut solver = Solver::new(&problem.solver_rules());
        info!("solving: {} variables, {} rules", solver.var_count(), solver.rule_count());

        let mut solutions = 0;
        while solver.next_solution() {
            solutions += 1;
            if solutions > config.max_solutions {
                info!(
                    "problem has more than {} solutions, output truncated",
                    config.max_solutions
                );
                break;
            }
            println!("Solution #{}:", solutions);
            for number in problem.named_numbers() {
                if let Some(slice) = problem.lookup_word(number) {
                    println!(
                        " {}={}",
                        var_name(number as i64),
                        word::read_value(&solver, &slice)
                    );
                }
            }
        }
        if solutions > config.max_solutions {
            solutions = config.max_solutions;
        }

        println!("{} solutions", solutions);
        info!("{} propagations", solver.propagations());
        info!("{} choices", solver.choices());
    }

    Ok(0)
}
