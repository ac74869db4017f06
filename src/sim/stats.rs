/// Per-attempt statistics and the append-only CSV log.
///
/// One `SessionStats` lives for exactly one attempt at one level. When the
/// attempt ends (goal or death) it is frozen into a `LevelRecord`, which the
/// frontend appends to the stats file (one line per attempt, header written
/// when the file is created).

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::config::ScoringConfig;
use crate::domain::hint::HintKind;

const RECORD_COLUMNS: &str =
    "player_name,level,jump_count,death_count,avg_jump_interval,hint_count,enemy_triggered,score,outcome";

/// Header line: the record columns, then one `hint_<key>` column per hint kind.
pub fn csv_header() -> String {
    let mut header = RECORD_COLUMNS.to_string();
    for kind in HintKind::ALL {
        header.push_str(",hint_");
        header.push_str(kind.key());
    }
    header
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Goal,
    Dead,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Goal => "goal",
            Outcome::Dead => "dead",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionStats {
    pub health: u32,
    pub score: u32,
    pub jump_count: u32,
    pub death_count: u32,
    /// Seconds of simulated time between consecutive successful jumps.
    pub jump_intervals: Vec<f32>,
    last_jump_tick: Option<u64>,
    pub hint_counts: BTreeMap<HintKind, u32>,
    pub hint_total: u32,
    pub enemy_triggered: u32,
}

impl SessionStats {
    pub fn new(scoring: &ScoringConfig) -> Self {
        SessionStats {
            health: scoring.start_health,
            score: scoring.start_score,
            jump_count: 0,
            death_count: 0,
            jump_intervals: vec![],
            last_jump_tick: None,
            hint_counts: BTreeMap::new(),
            hint_total: 0,
            enemy_triggered: 0,
        }
    }

    pub fn record_jump(&mut self, tick: u64, ticks_per_second: u64) {
        self.jump_count += 1;
        if let Some(prev) = self.last_jump_tick {
            let dt = tick.saturating_sub(prev) as f32 / ticks_per_second.max(1) as f32;
            self.jump_intervals.push(dt);
        }
        self.last_jump_tick = Some(tick);
    }

    pub fn record_hints(&mut self, hints: &[HintKind]) {
        for &h in hints {
            *self.hint_counts.entry(h).or_insert(0) += 1;
        }
        self.hint_total += hints.len() as u32;
    }

    pub fn hint_count(&self, kind: HintKind) -> u32 {
        self.hint_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Mean of the jump intervals; 0.0 with fewer than two jumps.
    pub fn avg_jump_interval(&self) -> f32 {
        if self.jump_intervals.is_empty() {
            return 0.0;
        }
        self.jump_intervals.iter().sum::<f32>() / self.jump_intervals.len() as f32
    }

    pub fn to_record(&self, player_name: &str, level: u32, outcome: Outcome) -> LevelRecord {
        LevelRecord {
            player_name: player_name.to_string(),
            level,
            jump_count: self.jump_count,
            death_count: self.death_count,
            avg_jump_interval: self.avg_jump_interval(),
            hint_count: self.hint_total,
            enemy_triggered: self.enemy_triggered,
            score: self.score,
            outcome,
            hint_counts: HintKind::ALL.map(|k| self.hint_count(k)),
        }
    }
}

/// One finished attempt, as written to the stats file.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRecord {
    pub player_name: String,
    pub level: u32,
    pub jump_count: u32,
    pub death_count: u32,
    pub avg_jump_interval: f32,
    pub hint_count: u32,
    pub enemy_triggered: u32,
    pub score: u32,
    pub outcome: Outcome,
    /// In `HintKind::ALL` order.
    pub hint_counts: [u32; 6],
}

impl LevelRecord {
    pub fn to_csv_line(&self) -> String {
        let mut fields = vec![
            csv_field(&self.player_name),
            self.level.to_string(),
            self.jump_count.to_string(),
            self.death_count.to_string(),
            format!("{:.3}", self.avg_jump_interval),
            self.hint_count.to_string(),
            self.enemy_triggered.to_string(),
            self.score.to_string(),
            self.outcome.as_str().to_string(),
        ];
        fields.extend(self.hint_counts.iter().map(|c| c.to_string()));
        fields.join(",")
    }
}

/// Quote a field if it contains a delimiter, quote or line break.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Append one record; writes the header first if the file is new or empty.
pub fn append_record(path: &Path, record: &LevelRecord) -> io::Result<()> {
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_header {
        writeln!(file, "{}", csv_header())?;
    }
    writeln!(file, "{}", record.to_csv_line())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> SessionStats {
        SessionStats::new(&ScoringConfig::default())
    }

    #[test]
    fn starts_from_scoring_config() {
        let s = stats();
        assert_eq!((s.health, s.score), (3, 10));
        assert_eq!(s.avg_jump_interval(), 0.0);
    }

    #[test]
    fn jump_intervals_are_in_simulated_seconds() {
        let mut s = stats();
        s.record_jump(60, 60);
        assert!(s.jump_intervals.is_empty());
        s.record_jump(90, 60);
        s.record_jump(210, 60);
        assert_eq!(s.jump_count, 3);
        assert_eq!(s.jump_intervals, vec![0.5, 2.0]);
        assert!((s.avg_jump_interval() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn hint_counters_accumulate() {
        let mut s = stats();
        s.record_hints(&[HintKind::JumpNow, HintKind::GoLeft]);
        s.record_hints(&[HintKind::GoLeft]);
        assert_eq!(s.hint_total, 3);
        assert_eq!(s.hint_count(HintKind::GoLeft), 2);
        assert_eq!(s.hint_count(HintKind::BeCareful), 0);
        let rec = s.to_record("ann", 2, Outcome::Goal);
        assert_eq!(rec.hint_counts, [1, 0, 0, 2, 0, 0]);
    }

    #[test]
    fn csv_line_layout() {
        let mut s = stats();
        s.record_jump(0, 60);
        s.record_jump(100, 60);
        s.death_count = 1;
        s.enemy_triggered = 1;
        s.score = 8;
        let line = s.to_record("Bo, the \"brave\"", 3, Outcome::Dead).to_csv_line();
        assert_eq!(line, "\"Bo, the \"\"brave\"\"\",3,2,1,1.667,0,1,8,dead,0,0,0,0,0,0");
        assert_eq!(csv_header().split(',').count(), line.split(',').count() - 1);
    }

    #[test]
    fn header_lists_hint_columns_in_record_order() {
        let header = csv_header();
        assert!(header.starts_with("player_name,level,"));
        assert!(header.ends_with(
            ",outcome,hint_jump_now,hint_enemy_close,hint_almost_there,hint_go_left,hint_go_right,hint_be_careful"
        ));
    }

    #[test]
    fn append_writes_header_once() {
        let dir = std::env::temp_dir().join(format!("shadowguide-stats-{}", std::process::id()));
        let path = dir.join("game_data.csv");
        let _ = std::fs::remove_file(&path);

        let rec = stats().to_record("p", 0, Outcome::Goal);
        append_record(&path, &rec).unwrap();
        append_record(&path, &rec).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], csv_header());
        assert_eq!(lines[1], lines[2]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
