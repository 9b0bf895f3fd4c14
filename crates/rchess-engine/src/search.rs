//! ランダム探索
//!
//! 評価は一切行わない。深さごとに合法手からランダムに PV を作り、
//! 符号付き16bit範囲のランダムなスコアを付けて `info` 行を出す。
//! 乱数生成器はセッションが所有するので、同じ seed と同じコマンド列なら出力は完全に一致する。

use std::io::{self, Write};

use rand::Rng;
use shakmaty::{CastlingMode, Chess, Position};

use crate::io::uci_println;
use crate::position::move_to_lan;

/// 1回の `go` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// 出力した `info` 行の数
    pub info_lines: usize,
    /// 空文字列なら合法手なし（または depth <= 0）
    pub best_move: String,
}

/// 局面から最大 `len` 手のランダムな手順を作る。
///
/// `pos` はコピーして進めるので呼び出し側の局面は変化しない。
/// 途中で合法手が無くなったらそこで打ち切る。
pub fn random_pv<G: Rng>(
    pos: &Chess,
    len: usize,
    rng: &mut G,
    mode: CastlingMode,
) -> Vec<String> {
    let mut scratch = pos.clone();
    let mut pv = Vec::with_capacity(len);

    for _ in 0..len {
        let moves = scratch.legal_moves();
        if moves.is_empty() {
            break;
        }
        let m = &moves[rng.random_range(0..moves.len())];
        pv.push(move_to_lan(m, mode));
        scratch.play_unchecked(*m);
    }
    pv
}

/// `go depth N` を実行し、`info` 行と `bestmove` 行を出力する。
pub fn run_go<W, G>(
    out: &mut W,
    pos: &Chess,
    depth: i32,
    rng: &mut G,
    mode: CastlingMode,
) -> io::Result<SearchReport>
where
    W: Write + ?Sized,
    G: Rng,
{
    let mut pv: Vec<String> = Vec::new();
    let mut info_lines = 0;

    for d in 1..=depth.max(0) as usize {
        pv = random_pv(pos, d, rng, mode);
        // 終局に達して短くなった手順は出力せずにループを終える
        if pv.len() < d {
            break;
        }
        let score = rng.random::<i16>();
        uci_println(out, &format!("info depth {d} score cp {score} pv {}", pv.join(" ")))?;
        info_lines += 1;
    }

    let best_move = pv.first().cloned().unwrap_or_default();
    uci_println(out, &format!("bestmove {best_move}"))?;
    Ok(SearchReport {
        info_lines,
        best_move,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{START_FEN, parse_fen};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    const MATED_FEN: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    /// 白は Ra8 で1手詰め
    const MATE_IN_ONE_FEN: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";

    fn run(fen: &str, depth: i32, seed: u64) -> (String, SearchReport) {
        let pos = parse_fen(fen, CastlingMode::Standard).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut out = Vec::new();
        let report = run_go(&mut out, &pos, depth, &mut rng, CastlingMode::Standard).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn depth_zero_emits_only_bestmove() {
        let (text, report) = run(START_FEN, 0, 1);
        assert_eq!(text, "bestmove \n");
        assert_eq!(report.info_lines, 0);
        assert!(report.best_move.is_empty());

        let (text, _) = run(START_FEN, -3, 1);
        assert_eq!(text, "bestmove \n");
    }

    #[test]
    fn one_info_line_per_depth() {
        let (text, report) = run(START_FEN, 4, 42);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines[..4].iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(tokens[0], "info");
            assert_eq!(tokens[2], (i + 1).to_string());
            assert_eq!(&tokens[3..5], &["score", "cp"]);
            let score: i32 = tokens[5].parse().unwrap();
            assert!((i16::MIN as i32..=i16::MAX as i32).contains(&score));
            assert_eq!(tokens[6], "pv");
            assert_eq!(tokens.len() - 7, i + 1);
        }
        // bestmove は最後の PV の先頭
        let last_pv_head = lines[3].split_whitespace().nth(7).unwrap();
        assert_eq!(lines[4], format!("bestmove {last_pv_head}"));
        assert_eq!(report.best_move, last_pv_head);
        assert_eq!(report.info_lines, 4);
    }

    #[test]
    fn no_legal_move_gives_empty_bestmove() {
        let (text, report) = run(MATED_FEN, 5, 7);
        assert_eq!(text, "bestmove \n");
        assert_eq!(report.info_lines, 0);
    }

    #[test]
    fn terminal_line_stops_the_loop() {
        // 深さ3までの手順が途中で終わるのは、初手 a1a8 で黒が詰む場合だけ。
        // 打ち切られたら info は打ち切り前の深さまで、bestmove は短い手順の初手 a1a8。
        let mut truncated = 0;
        for seed in 0..256 {
            let (text, report) = run(MATE_IN_ONE_FEN, 3, seed);
            let infos: Vec<&str> = text.lines().filter(|l| l.starts_with("info")).collect();
            assert_eq!(infos.len(), report.info_lines);
            assert!(report.info_lines >= 1, "seed {seed}: {text}");

            for (i, line) in infos.iter().enumerate() {
                let pv: Vec<&str> = line.split_whitespace().skip(7).collect();
                assert_eq!(pv.len(), i + 1, "seed {seed}: {line}");
                if i > 0 {
                    assert_ne!(pv[0], "a1a8", "seed {seed}: {line}");
                }
            }

            if report.info_lines < 3 {
                truncated += 1;
                assert_eq!(report.best_move, "a1a8", "seed {seed}: {text}");
            } else {
                let last_head = infos[2].split_whitespace().nth(7).unwrap();
                assert_eq!(report.best_move, last_head);
            }
        }
        assert!(truncated > 0);
        assert!(truncated < 256);
    }

    #[test]
    fn random_pv_does_not_touch_position() {
        let pos = parse_fen(START_FEN, CastlingMode::Standard).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let pv = random_pv(&pos, 10, &mut rng, CastlingMode::Standard);
        assert_eq!(pv.len(), 10);
        assert!(crate::position::same_position(&pos, &Chess::default()));
    }

    #[test]
    fn same_seed_same_output() {
        let (a, _) = run(START_FEN, 6, 12345);
        let (b, _) = run(START_FEN, 6, 12345);
        let (c, _) = run(START_FEN, 6, 54321);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
