use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const CSV_HEADER: &str = "source_analysis_id,source_start,source_center,source_end,\
grain_id,start_sample,center_sample,end_sample,\
source_period,synthesis_period,duration_samples,window_alpha";

/// Geometry of one synthesized grain: which analysis grain it came from,
/// where it landed in the output, and how it was windowed.
#[derive(Debug, Clone, PartialEq)]
pub struct GrainRecord {
    /// Sequential index in synthesis order.
    pub grain_id: usize,
    /// Start of the destination window.
    pub start_sample: usize,
    /// Synthesis mark position (center of the destination window).
    pub center_sample: usize,
    /// End of the destination window (exclusive).
    pub end_sample: usize,
    /// Index of the analysis mark this grain maps to.
    pub source_analysis_id: usize,
    /// Start of the source extraction.
    pub source_start: usize,
    /// The analysis mark itself.
    pub source_center: usize,
    /// End of the source extraction (exclusive).
    pub source_end: usize,
    /// Distance from the source mark to its next neighbor.
    pub source_period: usize,
    /// Distance from the synthesis mark to its next neighbor.
    pub synthesis_period: usize,
    /// Destination window length.
    pub duration_samples: usize,
    /// Tukey taper used for this grain.
    pub window_alpha: f32,
}

/// Everything observed during one traced synthesis pass. Populated by the
/// pipeline, never read back by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrainTrace {
    pub f_ratio: f32,
    pub signal_len: usize,
    pub analysis_mark_count: usize,
    pub synthesis_mark_count: usize,
    pub grains: Vec<GrainRecord>,
}

impl GrainTrace {
    pub(crate) fn record(&mut self, grain: GrainRecord) {
        self.grains.push(grain);
    }

    /// Writes one CSV row per grain, preceded by a header line.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("creating grain CSV {:?}", path.as_ref()))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "{}", CSV_HEADER)?;
        for grain in &self.grains {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{},{}",
                grain.source_analysis_id,
                grain.source_start,
                grain.source_center,
                grain.source_end,
                grain.grain_id,
                grain.start_sample,
                grain.center_sample,
                grain.end_sample,
                grain.source_period,
                grain.synthesis_period,
                grain.duration_samples,
                grain.window_alpha
            )?;
        }
        out.flush()
            .with_context(|| format!("writing grain CSV {:?}", path.as_ref()))
    }

    /// Writes the human-readable run summary.
    pub fn write_summary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("creating grain summary {:?}", path.as_ref()))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "TD-PSOLA Grain Analysis Summary")?;
        writeln!(out, "==================================================")?;
        writeln!(out)?;
        writeln!(out, "Pitch Shift Ratio (f_ratio): {}", self.f_ratio)?;
        writeln!(out, "Signal Length: {} samples", self.signal_len)?;
        writeln!(out, "Number of Analysis Grains: {}", self.analysis_mark_count)?;
        writeln!(
            out,
            "Number of Synthesis Grains: {}",
            self.synthesis_mark_count
        )?;
        out.flush()
            .with_context(|| format!("writing grain summary {:?}", path.as_ref()))
    }

    /// Writes both export artifacts next to `stem`:
    /// `<stem>_synthesis_grains.csv` and `<stem>_grain_summary.txt`.
    pub fn export<P: AsRef<Path>>(&self, stem: P) -> Result<()> {
        let stem = stem.as_ref();
        self.write_csv(sibling(stem, "_synthesis_grains.csv"))?;
        self.write_summary(sibling(stem, "_grain_summary.txt"))
    }
}

fn sibling(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
