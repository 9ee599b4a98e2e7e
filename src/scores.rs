use std::fs;
use std::path::PathBuf;

const MAGIC: &[u8; 4] = b"MCS1";
const NUM_GAMES: usize = 2;
const SCORES_PER_GAME: usize = 3;
const NAME_LEN: usize = 9;
// Each entry: 9 bytes name + 4 bytes little-endian score.
const ENTRY_SIZE: usize = NAME_LEN + 4;
const FILE_SIZE: usize = 4 + NUM_GAMES * SCORES_PER_GAME * ENTRY_SIZE;

pub const GAME_NAMES: [&str; NUM_GAMES] = ["Kart", "Reflex"];

#[derive(Clone)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    fn empty() -> Self {
        ScoreEntry {
            name: String::new(),
            score: 0,
        }
    }

    fn decode(chunk: &[u8]) -> Self {
        let name = String::from_utf8_lossy(&chunk[..NAME_LEN])
            .trim_end_matches('\0')
            .trim_end()
            .to_string();
        let score = u32::from_le_bytes([
            chunk[NAME_LEN],
            chunk[NAME_LEN + 1],
            chunk[NAME_LEN + 2],
            chunk[NAME_LEN + 3],
        ]);
        ScoreEntry { name, score }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        let name_bytes = self.name.as_bytes();
        let len = name_bytes.len().min(NAME_LEN);
        buf.extend_from_slice(&name_bytes[..len]);
        buf.resize(buf.len() + NAME_LEN - len, 0);
        buf.extend_from_slice(&self.score.to_le_bytes());
    }
}

#[derive(Clone)]
pub struct HighScores {
    scores: Vec<Vec<ScoreEntry>>,
    path: PathBuf,
    /// Which games already submitted a score this session, so one game-over
    /// screen produces exactly one prompt.
    submitted: [bool; NUM_GAMES],
}

impl HighScores {
    pub fn load() -> Self {
        Self::load_from(Self::scores_path())
    }

    fn load_from(path: PathBuf) -> Self {
        let mut hs = HighScores {
            scores: (0..NUM_GAMES)
                .map(|_| (0..SCORES_PER_GAME).map(|_| ScoreEntry::empty()).collect())
                .collect(),
            path,
            submitted: [false; NUM_GAMES],
        };
        hs.read_file();
        hs
    }

    fn scores_path() -> PathBuf {
        // Store next to the executable
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join("motioncade.scores");
            }
        }
        PathBuf::from("motioncade.scores")
    }

    fn read_file(&mut self) {
        let Ok(data) = fs::read(&self.path) else {
            return;
        };
        if data.len() < FILE_SIZE || &data[0..4] != MAGIC {
            return;
        }

        let mut chunks = data[4..].chunks_exact(ENTRY_SIZE);
        for game in 0..NUM_GAMES {
            for slot in 0..SCORES_PER_GAME {
                if let Some(chunk) = chunks.next() {
                    self.scores[game][slot] = ScoreEntry::decode(chunk);
                }
            }
        }
    }

    fn write_file(&self) {
        let mut buf = Vec::with_capacity(FILE_SIZE);
        buf.extend_from_slice(MAGIC);
        for game in &self.scores {
            for entry in game {
                entry.encode(&mut buf);
            }
        }
        let _ = fs::write(&self.path, &buf);
    }

    /// Check if a score would qualify for the top 3 (without inserting it)
    pub fn qualifies(&self, game_idx: usize, score: u32) -> bool {
        if game_idx >= NUM_GAMES || score == 0 {
            return false;
        }
        self.scores[game_idx].iter().any(|entry| score > entry.score)
    }

    /// Submit a score with a name. Returns true if it entered the top 3.
    pub fn submit(&mut self, game_idx: usize, name: &str, score: u32) -> bool {
        if game_idx >= NUM_GAMES || score == 0 {
            return false;
        }

        let name: String = name.chars().take(NAME_LEN).collect();
        let slots = &mut self.scores[game_idx];
        let Some(pos) = slots.iter().position(|entry| score > entry.score) else {
            return false;
        };

        slots.insert(pos, ScoreEntry { name, score });
        slots.truncate(SCORES_PER_GAME);
        self.write_file();
        true
    }

    /// Top 3 entries for a game, best first.
    pub fn top_scores(&self, game_idx: usize) -> Vec<ScoreEntry> {
        if game_idx >= NUM_GAMES {
            return vec![ScoreEntry::empty(); SCORES_PER_GAME];
        }
        self.scores[game_idx].clone()
    }

    /// Check if a game score has been submitted this run (to avoid duplicates)
    pub fn was_submitted(&self, game_idx: usize) -> bool {
        game_idx < NUM_GAMES && self.submitted[game_idx]
    }

    pub fn mark_submitted(&mut self, game_idx: usize) {
        if game_idx < NUM_GAMES {
            self.submitted[game_idx] = true;
        }
    }

    /// Clear submitted flag (called when game resets)
    pub fn clear_submitted(&mut self, game_idx: usize) {
        if game_idx < NUM_GAMES {
            self.submitted[game_idx] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> HighScores {
        let path = std::env::temp_dir().join(format!("motioncade-scores-{tag}"));
        let _ = fs::remove_file(&path);
        HighScores::load_from(path)
    }

    #[test]
    fn submit_sorts_descending_and_truncates() {
        let mut hs = temp_store("sort");
        assert!(hs.submit(0, "AAA", 100));
        assert!(hs.submit(0, "BBB", 300));
        assert!(hs.submit(0, "CCC", 200));
        assert!(hs.submit(0, "DDD", 250));
        let top = hs.top_scores(0);
        assert_eq!(top[0].score, 300);
        assert_eq!(top[1].score, 250);
        assert_eq!(top[2].score, 200);
        let _ = fs::remove_file(&hs.path);
    }

    #[test]
    fn zero_scores_never_qualify() {
        let hs = temp_store("zero");
        assert!(!hs.qualifies(0, 0));
        assert!(hs.qualifies(0, 1));
        assert!(!hs.qualifies(NUM_GAMES, 50));
    }

    #[test]
    fn table_round_trips_through_the_file() {
        let mut hs = temp_store("roundtrip");
        hs.submit(1, "ZOE", 42);
        hs.submit(0, "MAX", 7);
        let path = hs.path.clone();

        let reloaded = HighScores::load_from(path.clone());
        assert_eq!(reloaded.top_scores(1)[0].name, "ZOE");
        assert_eq!(reloaded.top_scores(1)[0].score, 42);
        assert_eq!(reloaded.top_scores(0)[0].score, 7);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn garbage_file_is_ignored() {
        let path = std::env::temp_dir().join("motioncade-scores-garbage");
        fs::write(&path, b"not a score table").unwrap();
        let hs = HighScores::load_from(path.clone());
        assert_eq!(hs.top_scores(0)[0].score, 0);
        let _ = fs::remove_file(&path);
    }
}
