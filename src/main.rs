use clap::{Parser, Subcommand};
use stagnation_markers::config::Configuration;
use stagnation_markers::host::MarkerSink;
use stagnation_markers::{AppError, InMemoryScene, TimingTool};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Parser)]
#[command(name = "stagnation-markers")]
#[command(about = "Marks timeline ranges where the selected controls hold still")]
struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the selection and replace the timing markers
    Analyze {
        #[arg(long, short)]
        scene: PathBuf,

        /// Movement threshold, defaults to the configured value
        #[arg(long, short)]
        threshold: Option<f64>,

        /// Where to write the updated scene, defaults to overwriting --scene
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Clear all timing markers
    Clear {
        #[arg(long, short)]
        scene: PathBuf,

        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List the timing markers of a scene
    Markers {
        #[arg(long, short)]
        scene: PathBuf,
    },
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// Loads the configuration with warnings going to `make_writer`, before the
/// configured log level is known.
fn load_configuration<W>(path: Option<&Path>, make_writer: W) -> Result<Configuration, AppError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::with_default(subscriber, || Configuration::load(path))
}

fn load_scene(path: &Path, configuration: &Configuration) -> Result<InMemoryScene, AppError> {
    let mut scene = InMemoryScene::from_json_file(path)?;
    scene.set_marker_prefix(&configuration.marker_prefix);
    Ok(scene)
}

fn print_markers(scene: &InMemoryScene) {
    for marker in scene.markers() {
        let [r, g, b] = marker.color.components();
        println!(
            "{}\t{}\t{}\t({:.3}, {:.3}, {:.3})",
            marker.name, marker.time_range_start, marker.time_range_stop, r, g, b
        );
    }
}

fn run(cli: Cli, configuration: Configuration) -> Result<(), AppError> {
    match cli.command {
        Commands::Analyze {
            scene,
            threshold,
            output,
        } => {
            let mut tool =
                TimingTool::from_configuration(load_scene(&scene, &configuration)?, &configuration);
            let threshold = threshold.unwrap_or(configuration.default_threshold);

            match tool.analyze(threshold) {
                Ok(_) => {}
                // Reported as a warning by the tool; nothing was changed.
                Err(e) if e.is_user_correctable() => return Ok(()),
                Err(e) => return Err(e.into()),
            }

            let scene_out = tool.into_host();
            scene_out.save_json_file(output.as_deref().unwrap_or(scene.as_path()))?;
            print_markers(&scene_out);
        }
        Commands::Clear { scene, output } => {
            let mut tool = TimingTool::new(load_scene(&scene, &configuration)?);
            let removed = tool.clear_markers()?;
            if removed > 0 || output.is_some() {
                tool.host()
                    .save_json_file(output.as_deref().unwrap_or(scene.as_path()))?;
            }
            println!("Removed {} markers", removed);
        }
        Commands::Markers { scene } => {
            print_markers(&load_scene(&scene, &configuration)?);
        }
    }
    Ok(())
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let configuration = load_configuration(cli.config.as_deref(), std::io::stderr)?;
    init_logging(configuration.level()?);
    run(cli, configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagnation_markers::common::Frame;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    const DEMO_SCENE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/step_scene.json");

    fn temp_path(extension: &str) -> PathBuf {
        let name = format!("stagnation-markers-{}.{}", Uuid::new_v4(), extension);
        std::env::temp_dir().join(name)
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stagnation-markers").chain(args.iter().copied()))
            .unwrap()
    }

    fn seeded() -> Configuration {
        Configuration {
            color_seed: Some(1),
            ..Configuration::default()
        }
    }

    fn bounds(scene: &InMemoryScene) -> Vec<(Frame, Frame)> {
        scene
            .markers()
            .iter()
            .map(|m| (m.time_range_start, m.time_range_stop))
            .collect()
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn analyze_writes_markers_to_output_and_clear_removes_them() {
        let output = temp_path("json");
        let output_arg = output.to_str().unwrap();

        run(
            cli(&["analyze", "--scene", DEMO_SCENE, "--output", output_arg]),
            seeded(),
        )
        .unwrap();

        let analyzed = InMemoryScene::from_json_file(&output).unwrap();
        assert_eq!(bounds(&analyzed), vec![(1, 4), (5, 10)]);
        assert_eq!(analyzed.markers()[0].name, "Stagnant_1_4");
        let demo = InMemoryScene::from_json_file(Path::new(DEMO_SCENE)).unwrap();
        assert!(demo.markers().is_empty());

        run(cli(&["clear", "--scene", output_arg]), seeded()).unwrap();
        let cleared = InMemoryScene::from_json_file(&output).unwrap();
        assert!(cleared.markers().is_empty());

        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn empty_selection_exits_cleanly_without_writing() {
        let scene = temp_path("json");
        std::fs::write(
            &scene,
            r#"{ "playback_range": { "start": 1, "end": 3 }, "selection": [] }"#,
        )
        .unwrap();
        let output = temp_path("json");

        run(
            cli(&[
                "analyze",
                "--scene",
                scene.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ]),
            seeded(),
        )
        .unwrap();

        assert!(!output.exists());
        let _ = std::fs::remove_file(&scene);
    }

    #[test]
    fn configuration_warnings_are_logged_before_logging_starts() {
        let path = temp_path("toml");
        std::fs::write(&path, "default_threshold = 50.0\n").unwrap();
        let logs = LogBuffer::default();
        let writer = logs.clone();

        let configuration = load_configuration(Some(&path), move || writer.clone()).unwrap();

        assert_eq!(configuration.default_threshold, 50.0);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("outside the usual range"), "{output}");
        let _ = std::fs::remove_file(&path);
    }
}
