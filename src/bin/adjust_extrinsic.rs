extern crate image as image_rs;

use std::fs::{self,File};
use std::io::{stdin,stdout,Write};
use std::path::{Path,PathBuf};
use std::sync::Mutex;
use clap::Parser;
use color_eyre::eyre::{Result,WrapErr};
use image_rs::RgbImage;
use termion::event::Key;
use termion::input::TermRead;
use termion::raw::IntoRawMode;

use lidarcam::{resolve_runtime_conf,RuntimeConf};
use lidarcam::io::frame_pairing::FrameSet;
use lidarcam::extrinsics::composer::DeltaAxis;
use lidarcam::session::{AdjustmentSession,command::Command};
use lidarcam::visualize::{Channel,color_map::{ColorMap,ColorMapper},overlay::draw_projection};

const OVERLAY_FILE: &str = "overlay.png";
const REFINED_CALIBRATION_FILE: &str = "refined_calibration.yaml";
const LOG_FILE: &str = "adjust_extrinsic.log";

/// Interactively refine a lidar to camera extrinsic.
///
/// q/a w/s e/d rotate about x/y/z, r/f t/g y/h translate along x/y/z,
/// z resets, n/p change frame, digits + Enter jump, x saves, Esc quits.
#[derive(Parser)]
#[command(name = "adjust_extrinsic")]
#[command(version)]
struct Cli {
    /// Runtime configuration (yaml)
    #[arg(short, long)]
    conf: Option<PathBuf>,

    /// Directory holding image/ and pointcloud/
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Calibration file to refine
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Directory for the overlay, the refined calibration and the log
    #[arg(short, long)]
    output: Option<PathBuf>
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut conf = resolve_runtime_conf(cli.conf.as_deref())?;
    if let Some(data) = cli.data { conf.data_path = data; }
    if let Some(calibration) = cli.calibration { conf.calibration_path = calibration; }
    if let Some(output) = cli.output { conf.output_path = output; }

    fs::create_dir_all(&conf.output_path).wrap_err("failed to create output directory")?;

    // The terminal is in raw mode while the session runs, so logs go to a file.
    let log_file = File::create(conf.output_path.join(LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let frames = FrameSet::from_dirs(&conf.data_path, &conf.image_extension, &conf.point_cloud_extension)?;
    let mut session = AdjustmentSession::open(&conf.calibration_path, conf.axis_convention, frames)
        .wrap_err_with(|| format!("cannot start without calibration {}", conf.calibration_path.display()))?;

    run(&mut session, &conf)
}

fn run(session: &mut AdjustmentSession, conf: &RuntimeConf) -> Result<()> {
    let overlay_path = conf.output_path.join(OVERLAY_FILE);
    let calibration_out = conf.output_path.join(REFINED_CALIBRATION_FILE);

    let mut stdout = stdout().into_raw_mode()?;
    let mut background = load_background(session)?;
    let mut message = String::new();
    let mut jump_buffer = String::new();

    render(session, &background.1, &overlay_path, conf)?;
    status(&mut stdout, session, &jump_buffer, &message)?;

    for key in stdin().keys() {
        let command = match key? {
            Key::Esc | Key::Ctrl('c') => break,
            Key::Char(c) if c.is_ascii_digit() => {
                jump_buffer.push(c);
                status(&mut stdout, session, &jump_buffer, &message)?;
                continue;
            },
            Key::Backspace => {
                jump_buffer.pop();
                status(&mut stdout, session, &jump_buffer, &message)?;
                continue;
            },
            Key::Char('\n') => match jump_buffer.parse::<usize>() {
                Ok(index) => Command::JumpToFrame(index),
                Err(_) => continue
            },
            Key::Char(c) => match command_for_key(c, conf, &calibration_out) {
                Some(command) => command,
                None => continue
            },
            _ => continue
        };
        jump_buffer.clear();

        message = match session.apply(command) {
            Ok(()) => String::new(),
            Err(e) => e.to_string()
        };

        if background.0 != session.current_index() {
            background = load_background(session)?;
        }
        render(session, &background.1, &overlay_path, conf)?;
        status(&mut stdout, session, &jump_buffer, &message)?;
    }

    write!(stdout, "\r\n")?;
    Ok(())
}

fn command_for_key(key: char, conf: &RuntimeConf, calibration_out: &Path) -> Option<Command> {
    let r = conf.rotation_step;
    let t = conf.translation_step;
    let command = match key {
        'q' => Command::Nudge(DeltaAxis::Alpha, r),
        'a' => Command::Nudge(DeltaAxis::Alpha, -r),
        'w' => Command::Nudge(DeltaAxis::Beta, r),
        's' => Command::Nudge(DeltaAxis::Beta, -r),
        'e' => Command::Nudge(DeltaAxis::Gamma, r),
        'd' => Command::Nudge(DeltaAxis::Gamma, -r),
        'r' => Command::Nudge(DeltaAxis::X, t),
        'f' => Command::Nudge(DeltaAxis::X, -t),
        't' => Command::Nudge(DeltaAxis::Y, t),
        'g' => Command::Nudge(DeltaAxis::Y, -t),
        'y' => Command::Nudge(DeltaAxis::Z, t),
        'h' => Command::Nudge(DeltaAxis::Z, -t),
        'z' => Command::ResetDeltas,
        'n' => Command::NextFrame,
        'p' => Command::PreviousFrame,
        'x' => Command::Save{path: calibration_out.to_path_buf(), mode: conf.save_mode},
        _ => return None
    };
    Some(command)
}

fn load_background(session: &AdjustmentSession) -> Result<(usize, RgbImage)> {
    let image_path = &session.current_frame().pair.image;
    let image = image_rs::open(image_path)
        .wrap_err_with(|| format!("failed to open {}", image_path.display()))?
        .to_rgb8();
    Ok((session.current_index(), image))
}

/// Every front facing point is drawn, off canvas points are clipped by the raster.
fn render(session: &AdjustmentSession, background: &RgbImage, path: &Path, conf: &RuntimeConf) -> Result<()> {
    let projection = session.project(None);
    let mapper = ColorMapper::for_channel(ColorMap::Intensity, Channel::Depth, &projection.points);
    let mut overlay = background.clone();
    draw_projection(&mut overlay, &projection.points, Channel::Depth, &mapper, conf.point_radius, conf.overlay_alpha);
    overlay.save(path)?;
    Ok(())
}

fn status<W: Write>(out: &mut W, session: &AdjustmentSession, jump_buffer: &str, message: &str) -> Result<()> {
    let d = session.deltas();
    write!(out, "\r{}frame {} of {} | alpha {:+.2} beta {:+.2} gamma {:+.2} | dx {:+.2} dy {:+.2} dz {:+.2}",
        termion::clear::CurrentLine, session.current_index(), session.frame_count(),
        d.alpha, d.beta, d.gamma, d.dx, d.dy, d.dz)?;
    if !jump_buffer.is_empty() {
        write!(out, " | jump to {}", jump_buffer)?;
    }
    if !message.is_empty() {
        write!(out, " | {}", message)?;
    }
    out.flush()?;
    Ok(())
}
