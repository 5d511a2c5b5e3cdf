use radixtree_harness::run_all;
use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = env_logger::builder().format_timestamp(None).try_init();

    let filter = std::env::args().nth(1);
    let outcomes = run_all(filter.as_deref());

    let mut passed = 0usize;
    for o in &outcomes {
        println!("\n=> {}", o.name);
        if o.passed() {
            println!("ok");
            passed += 1;
        } else {
            match &o.got {
                Ok(got) => println!("!!!!!!!!!!! expected:{} got:{}", o.expected, got),
                Err(e) => println!("!!!!!!!!!!! expected:{} error:{}", o.expected, e),
            }
        }
    }
    println!("Passed {}/{}", passed, outcomes.len());

    if passed == outcomes.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
