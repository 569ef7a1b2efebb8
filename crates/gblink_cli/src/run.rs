//! `gblink run`: execute the stimulus schedule against the link-port model.
//!
//! Loads the run configuration, applies command-line overrides, forwards
//! plus-arguments to the model, opens the waveform file, and runs the driver.
//! The run summary goes to stderr (or stdout as JSON with `--format json`).

use std::path::{Path, PathBuf};

use gblink_config::{find_config, load_config, validate_config, RunConfig};
use gblink_sim::{
    enable_capture, Driver, LinkModel, LinkParams, PlusArgs, RunReport, Timescale, TraceFile,
    VcdTrace,
};

use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Runs the `gblink run` command. Returns exit code 0 on completion and on
/// an early finish requested by the model.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Configuration file plus flag overrides
    let base = load_run_config(global)?;
    let config = apply_overrides(base, args)?;

    // Step 2: Forward runtime arguments to the model, then build it
    let plusargs = PlusArgs::parse(&args.model_args);
    if !plusargs.is_empty() {
        tracing::debug!(count = plusargs.len(), "forwarding plusargs to model");
    }
    let params = LinkParams::from_config(&config.model).with_plusargs(&plusargs)?;
    let model = LinkModel::new(params);
    let mut driver: Driver<LinkModel, VcdTrace<TraceFile>> =
        Driver::from_config(model, &config.run);

    // Step 3: Waveform capture
    let waveform_path = if config.trace.enabled {
        let timescale: Timescale = config.trace.timescale.parse()?;
        enable_capture();
        let path = trace_path(&config);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let trace = VcdTrace::create(&path, timescale, config.trace.compress)?;
        driver.attach_trace(trace, config.trace.depth)?;
        Some(path)
    } else {
        None
    };

    // Step 4: Power-on stimulus, then run
    driver.initialize(&config.stimulus)?;
    let report = driver.run()?;

    // Step 5: Summary
    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            if !global.quiet {
                print_summary(&report, waveform_path.as_deref());
            }
        }
    }

    Ok(0)
}

/// Loads `--config`, else `./gblink.toml`, else the built-in defaults.
fn load_run_config(global: &GlobalArgs) -> Result<RunConfig, Box<dyn std::error::Error>> {
    if let Some(path) = &global.config {
        tracing::debug!(path = %path, "loading configuration");
        return Ok(load_config(Path::new(path))?);
    }
    match find_config(&std::env::current_dir()?) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            Ok(load_config(&path)?)
        }
        None => Ok(RunConfig::default()),
    }
}

/// Applies command-line flags on top of the loaded configuration.
fn apply_overrides(
    mut config: RunConfig,
    args: &RunArgs,
) -> Result<RunConfig, Box<dyn std::error::Error>> {
    if let Some(steps) = args.steps {
        config.run.steps = steps;
    }
    if let Some(output) = &args.output {
        config.trace.path = output.clone();
    }
    if let Some(depth) = args.depth {
        config.trace.depth = depth;
    }
    if args.no_trace {
        config.trace.enabled = false;
    }
    if args.gzip {
        config.trace.compress = true;
    }
    validate_config(&config)?;
    Ok(config)
}

/// Trace file path; compressed traces get a `.gz` suffix if it is missing.
fn trace_path(config: &RunConfig) -> PathBuf {
    let path = &config.trace.path;
    if config.trace.compress && !path.ends_with(".gz") {
        PathBuf::from(format!("{path}.gz"))
    } else {
        PathBuf::from(path)
    }
}

fn print_summary(report: &RunReport, waveform: Option<&Path>) {
    if report.finished_early {
        eprintln!(
            "   Model requested finish after {} steps ({})",
            report.steps_completed, report.final_time
        );
    } else {
        eprintln!(
            "   Simulated {} steps ({})",
            report.steps_completed, report.final_time
        );
    }
    if let Some(path) = waveform {
        eprintln!("   Waveform: {} ({} samples)", path.display(), report.samples);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args() -> RunArgs {
        RunArgs {
            steps: None,
            output: None,
            no_trace: false,
            gzip: false,
            depth: None,
            format: ReportFormat::Text,
            model_args: Vec::new(),
        }
    }

    fn global_with(config: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(config.to_str().unwrap().to_string()),
        }
    }

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("gblink.toml");
        fs::write(&path, body).unwrap();
        path
    }

    fn sample_times(vcd: &str) -> Vec<u64> {
        vcd.lines()
            .filter_map(|l| l.strip_prefix('#'))
            .map(|t| t.parse().unwrap())
            .collect()
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut a = args();
        a.steps = Some(12);
        a.output = Some("x.vcd".to_string());
        a.depth = Some(1);
        a.gzip = true;
        let config = apply_overrides(RunConfig::default(), &a).unwrap();
        assert_eq!(config.run.steps, 12);
        assert_eq!(config.trace.path, "x.vcd");
        assert_eq!(config.trace.depth, 1);
        assert!(config.trace.compress);
        assert!(config.trace.enabled);
    }

    #[test]
    fn overrides_are_validated() {
        let mut a = args();
        a.steps = Some(0);
        assert!(apply_overrides(RunConfig::default(), &a).is_err());
    }

    #[test]
    fn no_trace_disables_output() {
        let mut a = args();
        a.no_trace = true;
        let config = apply_overrides(RunConfig::default(), &a).unwrap();
        assert!(!config.trace.enabled);
    }

    #[test]
    fn gzip_path_gets_suffix() {
        let mut config = RunConfig::default();
        assert_eq!(trace_path(&config), PathBuf::from("link.vcd"));
        config.trace.compress = true;
        assert_eq!(trace_path(&config), PathBuf::from("link.vcd.gz"));
        config.trace.path = "a.vcd.gz".to_string();
        assert_eq!(trace_path(&config), PathBuf::from("a.vcd.gz"));
    }

    #[test]
    fn explicit_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[run]\nsteps = 9\n");
        let config = load_run_config(&global_with(&path)).unwrap();
        assert_eq!(config.run.steps, 9);
    }

    #[test]
    fn missing_explicit_config_errors() {
        let tmp = TempDir::new().unwrap();
        let global = global_with(&tmp.path().join("absent.toml"));
        assert!(load_run_config(&global).is_err());
    }

    #[test]
    fn run_writes_trace() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("waves").join("link.vcd");
        let path = write_config(&tmp, "[run]\nsteps = 20\n");
        let mut a = args();
        a.output = Some(out.to_str().unwrap().to_string());

        let code = run(&a, &global_with(&path)).unwrap();
        assert_eq!(code, 0);

        let vcd = fs::read_to_string(&out).unwrap();
        assert!(vcd.contains("$scope module link $end"));
        assert_eq!(sample_times(&vcd), (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn run_without_trace_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("link.vcd");
        let path = write_config(&tmp, "[run]\nsteps = 5\n");
        let mut a = args();
        a.output = Some(out.to_str().unwrap().to_string());
        a.no_trace = true;

        assert_eq!(run(&a, &global_with(&path)).unwrap(), 0);
        assert!(!out.exists());
    }

    #[test]
    fn early_finish_exits_zero_with_closed_trace() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("early.vcd");
        let path = write_config(&tmp, "[model]\nserial_half_period = 2\n");
        let mut a = args();
        a.output = Some(out.to_str().unwrap().to_string());
        a.model_args = vec!["+finish_after_transfers=1".to_string()];

        assert_eq!(run(&a, &global_with(&path)).unwrap(), 0);
        let times = sample_times(&fs::read_to_string(&out).unwrap());
        assert!(times.len() < 10_000);
        assert_eq!(times.len() % 2, 0);
    }

    #[test]
    fn bad_plusarg_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[run]\nsteps = 5\n[trace]\nenabled = false\n");
        let mut a = args();
        a.model_args = vec!["+serial_half_period=zero".to_string()];
        let err = run(&a, &global_with(&path)).unwrap_err();
        assert!(err.to_string().contains("serial_half_period"));
    }

    #[test]
    fn bad_timescale_fails_before_touching_disk() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("waves").join("t.vcd");
        let path = write_config(&tmp, "[trace]\ntimescale = \"3ns\"\n");
        let mut a = args();
        a.output = Some(out.to_str().unwrap().to_string());
        let err = run(&a, &global_with(&path)).unwrap_err();
        assert!(err.to_string().contains("invalid timescale"));
        assert!(!tmp.path().join("waves").exists());
    }

    #[test]
    fn unwritable_trace_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let path = write_config(&tmp, "[run]\nsteps = 5\n");
        let mut a = args();
        a.output = Some(blocker.join("link.vcd").to_str().unwrap().to_string());
        assert!(run(&a, &global_with(&path)).is_err());
    }
}
