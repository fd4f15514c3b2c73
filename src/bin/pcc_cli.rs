#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("pcc_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use pcc_engine::pcc::{CouplingFrameSource, PccParams};
    use pcc_engine::tendon::{AnalysisResult, TendonConfig};
    use pcc_engine::{Engine, EngineOptions};
    use std::f64::consts::{FRAC_PI_3, PI};
    use std::fmt::Write as _;
    use std::fs;
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"pcc_cli (pcc-engine)

USAGE:
  pcc_cli list
  pcc_cli run <scenario|all> [options]

SCENARIOS:
  straight
  three_segment_bend
  single_segment
  half_turn

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.json to this dir (required for `all`)
  --json <path>      Write JSON to this path (single scenario only)
  --positions-only   Infer coupling frames from sampled positions
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut out_dir: Option<PathBuf> = None;
        let mut json_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut frame_source = CouplingFrameSource::ExplicitAngles;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--json" => json_path = Some(PathBuf::from(args.value("--json")?)),
                "--positions-only" => frame_source = CouplingFrameSource::PositionsOnly,
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let mut engine = Engine::with_options(EngineOptions {
            frame_source,
            ..EngineOptions::default()
        });

        if let Some(dir) = out_dir.as_ref() {
            if json_path.is_some() {
                return Err("use either --out-dir or --json (not both)".to_string());
            }

            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(&mut engine, *scenario, dir, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_str(scenario_name.as_str())
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(&mut engine, scenario, dir, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario =
            Scenario::from_str(scenario_name.as_str()).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let result = run_scenario(&mut engine, scenario)?;
        let json = to_json(&result)?;

        if let Some(path) = json_path.as_deref() {
            write_text_file(path, &json, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            println!("{json}");
        }

        eprintln!("{}", summary(scenario, &result));
        Ok(())
    }

    fn run_one_scenario_to_dir(
        engine: &mut Engine,
        scenario: Scenario,
        dir: &Path,
        overwrite: bool,
    ) -> Result<(), String> {
        let result = run_scenario(engine, scenario)?;
        let path = dir.join(format!("{}.json", scenario.name()));
        write_text_file(&path, &to_json(&result)?, overwrite)?;
        eprintln!("wrote {}", path.display());
        eprintln!("{}", summary(scenario, &result));
        Ok(())
    }

    fn run_scenario(engine: &mut Engine, scenario: Scenario) -> Result<AnalysisResult, String> {
        engine
            .analyze(&scenario.params())
            .map_err(|e| format!("{}: {e}", scenario.name()))
    }

    fn to_json(result: &AnalysisResult) -> Result<String, String> {
        serde_json::to_string_pretty(result).map_err(|e| format!("serialize result: {e}"))
    }

    fn summary(scenario: Scenario, result: &AnalysisResult) -> String {
        let mut line = format!(
            "{}: segments={} couplings={} tendons={} |",
            scenario.name(),
            result.robot_positions.len(),
            result.coupling_data.positions.len(),
            result.actuation_commands.len()
        );
        for (id, command) in &result.actuation_commands {
            let _ = write!(
                line,
                " {id}:{} {:.6}",
                command.pull_direction.as_str(),
                command.magnitude
            );
        }
        if let Some(timing) = result.timing.as_ref() {
            let _ = write!(line, " | {:.3} ms", timing.total_ms());
        }
        line
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        let text = if text.ends_with('\n') {
            text.to_string()
        } else {
            format!("{text}\n")
        };
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        Straight,
        ThreeSegmentBend,
        SingleSegment,
        HalfTurn,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::Straight,
            Scenario::ThreeSegmentBend,
            Scenario::SingleSegment,
            Scenario::HalfTurn,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::Straight => "straight",
                Scenario::ThreeSegmentBend => "three_segment_bend",
                Scenario::SingleSegment => "single_segment",
                Scenario::HalfTurn => "half_turn",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            match name {
                "straight" => Some(Scenario::Straight),
                "three_segment_bend" => Some(Scenario::ThreeSegmentBend),
                "single_segment" => Some(Scenario::SingleSegment),
                "half_turn" => Some(Scenario::HalfTurn),
                _ => None,
            }
        }

        fn params(self) -> PccParams {
            match self {
                Scenario::Straight => PccParams::new(
                    vec![0.0; 3],
                    vec![0.0; 3],
                    vec![0.07; 3],
                    vec![0.03; 4],
                    10,
                ),
                Scenario::ThreeSegmentBend => PccParams::new(
                    vec![PI / 5.0; 3],
                    vec![FRAC_PI_3; 3],
                    vec![0.07; 3],
                    vec![0.03; 4],
                    100,
                )
                .with_tendon_config(TendonConfig::new(3, 0.03, 0.0)),
                Scenario::SingleSegment => PccParams::new(
                    vec![0.8],
                    vec![0.0],
                    vec![0.1],
                    vec![0.02, 0.02],
                    50,
                )
                .with_tendon_config(TendonConfig::new(4, 0.02, 0.005)),
                Scenario::HalfTurn => PccParams::new(
                    vec![PI / 2.0, PI / 2.0],
                    vec![0.0, 0.0],
                    vec![0.1, 0.1],
                    vec![0.02, 0.02, 0.02],
                    200,
                )
                .with_tendon_config(TendonConfig::new(6, 0.025, 0.0)),
            }
        }
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
