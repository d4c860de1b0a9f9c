//! Stand-in engine binary for end to end tests.
//!
//! Speaks just enough of the real engine's command line and output format
//! to satisfy the stock fleet expectations. The first argument is the test
//! target; which lines get printed is decided by the target's file stem.

use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let Some(target) = args.first().filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: graybox-mock <target> [flags...]");
        return ExitCode::from(2);
    };

    if let Err(flag) = swallow_flags(&args[1..]) {
        eprintln!("graybox-mock: unrecognized flag `{flag}`");
        return ExitCode::from(2);
    }

    let stem = Path::new(target)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("");

    run_target(stem)
}

/// Accepts the flag set the harness is allowed to pass and nothing else.
fn swallow_flags(flags: &[String]) -> Result<(), String> {
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--fuzz" | "--klee" | "--take_over" => {}
            "--num_workers" | "--timeout" => {
                if iter.next().is_none() {
                    return Err(flag.clone());
                }
            }
            other => return Err(other.to_string()),
        }
    }
    Ok(())
}

fn run_target(stem: &str) -> ExitCode {
    match stem {
        "IntegerArithmetic" => {
            println!("Passed: Arithmetic_AdditionIsCommutative");
            println!("Passed: Arithmetic_AdditionIsAssociative");
            println!("Passed: Arithmetic_InvertibleMultiplication_CanFail");
            println!("Failed: Arithmetic_InvertibleMultiplication_CanFail");
        }
        "OneOf" => {
            println!("Passed: OneOfExample_ProduceSixtyOrHigher");
            println!("Failed: OneOfExample_ProduceSixtyOrHigher");
        }
        "TakeOver" => {
            println!("hi");
            eprintln!("CRITICAL: value was not greater than 10");
            println!("Saved test case in file `takeover_0.pass`");
            println!("bye");
        }
        "IntegerOverflow" => {
            println!("Passed: SignedInteger_AdditionOverflow");
            println!("Failed: SignedInteger_AdditionOverflow");
            println!("Passed: SignedInteger_MultiplicationOverflow");
            println!("Failed: SignedInteger_MultiplicationOverflow");
        }
        "Klee" => {
            println!("INFO: argument is zero");
            println!("INFO: argument is positive");
            println!("INFO: argument is negative");
        }
        "BoringDisabled" => {
            println!("Passed: CharTest_BoringVerifyCheck");
            println!("Failed: CharTest_VerifyCheck");
        }
        "Crash" => {
            println!("Passed: Crash_SegFault");
            println!("Saved test case in file `crash_0.crash`");
        }
        "StreamingAndFormatting" => {
            println!("Failed: Streaming_BasicLevels");
            eprintln!("DEBUG: This is a debug message");
            eprintln!("TRACE: This is a trace message");
            println!("INFO: This is an info message");
            eprintln!("WARNING: This is a warning message");
            eprintln!("ERROR: This is a error message");
            eprintln!("TRACE: This is a trace message again");
            println!("INFO: char: 97");
            println!("INFO: bool: 1");
            println!("INFO: double: 1.000000");
            println!("INFO: kind: string");
            println!("INFO: hello string=world");
            println!("INFO: hello again!");
            println!("Passed: Formatting_OverridePrintf");
        }
        "Lists" => {
            println!("Passed: Vector_DoubleReversal");
        }
        "Fixture" => {
            println!("Setting up!");
            println!("Passed: MyTest_Something");
            println!("Tearing down!");
        }
        "Primes" => {
            println!("Failed: PrimePolynomial_OnlyGeneratesPrimes");
            println!("Failed: PrimePolynomial_OnlyGeneratesPrimes_NoStreaming");
        }
        "Runlen" => {
            println!("Passed: Runlength_EncodeDecode");
            println!("Saved test case in file `runlen_0.fail`");
        }
        // Alternates stdout and stderr so capture ordering can be checked.
        "Interleave" => {
            println!("first on stdout");
            eprintln!("second on stderr");
            println!("third on stdout");
        }
        // Prints a little, then never exits on its own.
        "Hang" => {
            println!("engine started");
            eprintln!("WARNING: entering fuzz loop");
            loop {
                thread::sleep(Duration::from_secs(60));
            }
        }
        "ExitThree" => {
            println!("engine giving up");
            return ExitCode::from(3);
        }
        other => {
            eprintln!("ERROR: no such target `{other}`");
            return ExitCode::from(1);
        }
    }
    ExitCode::SUCCESS
}
