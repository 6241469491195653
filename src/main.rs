//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8-emu run <program>` - Run an .ls8 program file

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of the LS-8 8-bit register machine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the .ls8 file to execute
        program: String,
        /// Maximum number of cycles to run (default: 100000)
        #[arg(short, long, default_value = "100000")]
        max_cycles: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Dump the final machine state as JSON
        #[arg(long)]
        dump_state: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { program, max_cycles, trace, dump_state } => {
            run_program(&program, max_cycles, trace, dump_state);
        }
    }
}

fn run_program(path: &str, max_cycles: u64, trace: bool, dump_state: bool) {
    use ls8::{load_program, Cpu};

    let program = match load_program(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(2);
        }
    };

    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(2);
    }

    eprintln!("📂 Loaded {} bytes from {}", program.len(), path);

    let mut cpu = Cpu::new(std::io::stdout());
    if let Err(e) = cpu.load_program(&program) {
        eprintln!("❌ Failed to load program into memory: {}", e);
        std::process::exit(2);
    }

    if trace {
        while cpu.is_running() && cpu.cycles < max_cycles {
            let pc = cpu.pc;
            match cpu.step() {
                Ok(instr) => {
                    eprintln!("{:03}: {}", pc, instr);
                }
                Err(e) => {
                    eprintln!("❌ CPU fault at PC={}: {}", pc, e);
                    std::process::exit(1);
                }
            }
        }
    } else if let Err(e) = cpu.run_limited(max_cycles) {
        eprintln!("❌ CPU fault at PC={}: {}", cpu.pc, e);
        std::process::exit(1);
    }

    eprintln!();
    eprintln!("━━━ Result ━━━");
    eprintln!("Cycles: {}", cpu.cycles);
    eprintln!("State: {:?}", cpu.state);
    for index in 0..8u8 {
        let value = cpu.regs.get(index).unwrap_or(0);
        eprintln!("R{}: {}", index, value);
    }

    if cpu.is_running() {
        eprintln!();
        eprintln!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }

    if dump_state {
        match serde_json::to_string_pretty(&cpu.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    }
}
