use serde::{Deserialize, Serialize};

/// 1局の結果（ワーカー側の視点）
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Win, Outcome::Loss, Outcome::Draw];

    /// wld 配列上の添字
    pub const fn index(self) -> usize {
        match self {
            Outcome::Win => 0,
            Outcome::Loss => 1,
            Outcome::Draw => 2,
        }
    }

    /// 相手側から見た結果
    pub const fn flip(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
        }
    }
}

/// 勝ち・負け・引き分けの集計
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
}

impl Tally {
    pub fn from_wld(wld: [u64; 3]) -> Self {
        Self {
            wins: wld[0],
            losses: wld[1],
            draws: wld[2],
        }
    }

    pub fn wld(&self) -> [u64; 3] {
        [self.wins, self.losses, self.draws]
    }

    pub fn get(&self, outcome: Outcome) -> u64 {
        self.wld()[outcome.index()]
    }

    pub fn total(&self) -> u64 {
        self.wins + self.losses + self.draws
    }

    /// 勝ち=1, 引き分け=0.5 のスコア率。対局なしなら None。
    pub fn score_rate(&self) -> Option<f64> {
        let n = self.total();
        (n > 0).then(|| (self.wins as f64 + 0.5 * self.draws as f64) / n as f64)
    }
}

impl std::ops::AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.wins += rhs.wins;
        self.losses += rhs.losses;
        self.draws += rhs.draws;
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "W {} / L {} / D {}", self.wins, self.losses, self.draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_wld_order() {
        let t = Tally::from_wld([3, 2, 1]);
        assert_eq!(t.get(Outcome::Win), 3);
        assert_eq!(t.get(Outcome::Loss), 2);
        assert_eq!(t.get(Outcome::Draw), 1);
        assert_eq!(t.total(), 6);
    }

    #[test]
    fn score_rate_counts_draws_as_half() {
        assert_eq!(Tally::default().score_rate(), None);
        let t = Tally::from_wld([1, 1, 2]);
        assert_eq!(t.score_rate(), Some(0.5));
    }

    #[test]
    fn flip_swaps_win_and_loss() {
        assert_eq!(Outcome::Win.flip(), Outcome::Loss);
        assert_eq!(Outcome::Draw.flip(), Outcome::Draw);
        for o in Outcome::ALL {
            assert_eq!(o.flip().flip(), o);
        }
    }
}
