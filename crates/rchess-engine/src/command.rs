//! UCI protocol command parser

use crate::error::{SessionError, SessionResult};

/// 局面の出発点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSource {
    StartPos,
    /// FEN fields joined by single spaces
    Fen(String),
}

/// Parameters for go command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Requested search depth; `None` keeps the session's previous depth
    pub depth: Option<i32>,
}

/// UCI protocol commands understood by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// Handshake
    Uci,

    /// Check if engine is ready
    IsReady,

    /// Set engine option
    SetOption { name: String, value: Option<String> },

    /// Set position
    Position { source: PositionSource, moves: Vec<String> },

    /// Start the (randomized) search
    Go(GoParams),

    /// Quit the session
    Quit,
}

/// 1行を解析する。
///
/// 未知のコマンド・空行・形式不正の `setoption` は `Ok(None)`（黙って無視）。
/// `position` の出発点キーワード欠落だけはエラーとして返す。
pub fn parse_command(line: &str) -> SessionResult<Option<UciCommand>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = parts.split_first() else {
        return Ok(None);
    };

    let cmd = match head {
        "uci" => Some(UciCommand::Uci),
        "isready" => Some(UciCommand::IsReady),
        "quit" => Some(UciCommand::Quit),
        "setoption" => parse_setoption(rest),
        "position" => Some(parse_position(rest)?),
        "go" => Some(UciCommand::Go(parse_go(rest))),
        _ => None,
    };
    Ok(cmd)
}

/// Parse setoption command: `name <name> [value <value>]`
fn parse_setoption(parts: &[&str]) -> Option<UciCommand> {
    if parts.len() < 2 || parts[0] != "name" {
        return None;
    }

    let value_pos = parts.iter().position(|&p| p == "value");
    let name_end = value_pos.unwrap_or(parts.len());
    if name_end <= 1 {
        return None;
    }
    let name = parts[1..name_end].join(" ");

    // "value" の後に何も無ければ値なし扱い
    let value = value_pos
        .map(|pos| parts[pos + 1..].join(" "))
        .filter(|v| !v.is_empty());

    Some(UciCommand::SetOption { name, value })
}

/// Parse position command
fn parse_position(parts: &[&str]) -> SessionResult<UciCommand> {
    let (source, moves_start) = match parts.first().copied() {
        Some("startpos") => (PositionSource::StartPos, 1),
        Some("fen") => {
            let fen_end = parts.iter().position(|&p| p == "moves").unwrap_or(parts.len());
            (PositionSource::Fen(parts[1..fen_end].join(" ")), fen_end)
        }
        other => return Err(SessionError::MissingPositionSource(other.map(str::to_string))),
    };

    // startpos の直後が moves 以外なら残りは無視する
    let moves = match parts.get(moves_start) {
        Some(&"moves") => parts[moves_start + 1..].iter().map(|s| s.to_string()).collect(),
        _ => Vec::new(),
    };

    Ok(UciCommand::Position { source, moves })
}

/// Parse go command. Only `depth` is honored; everything else is skipped.
fn parse_go(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut it = parts.iter();
    while let Some(&tok) = it.next() {
        if tok == "depth" {
            params.depth = it.next().map(|v| v.parse().unwrap_or(0));
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_command("uci").unwrap(), Some(UciCommand::Uci));
        assert_eq!(parse_command("isready").unwrap(), Some(UciCommand::IsReady));
        assert_eq!(parse_command("  quit  ").unwrap(), Some(UciCommand::Quit));
    }

    #[test]
    fn test_unknown_and_empty_are_ignored() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("ucinewgame").unwrap(), None);
        assert_eq!(parse_command("stop").unwrap(), None);
    }

    #[test]
    fn test_parse_setoption() {
        let cmd = parse_command("setoption name UCI_Chess960 value true").unwrap();
        assert_eq!(
            cmd,
            Some(UciCommand::SetOption {
                name: "UCI_Chess960".to_string(),
                value: Some("true".to_string()),
            })
        );

        // "value" keyword without actual value should be None
        match parse_command("setoption name UCI_Chess960 value").unwrap() {
            Some(UciCommand::SetOption { name, value }) => {
                assert_eq!(name, "UCI_Chess960");
                assert_eq!(value, None);
            }
            other => panic!("Expected SetOption, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_setoption_is_ignored() {
        assert_eq!(parse_command("setoption").unwrap(), None);
        assert_eq!(parse_command("setoption UCI_Chess960 true").unwrap(), None);
        assert_eq!(parse_command("setoption name value true").unwrap(), None);
    }

    #[test]
    fn test_parse_position_startpos() {
        let cmd = parse_command("position startpos moves e2e4 e7e5").unwrap();
        assert_eq!(
            cmd,
            Some(UciCommand::Position {
                source: PositionSource::StartPos,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()],
            })
        );

        // moves の無い "moves" は空リスト
        match parse_command("position startpos moves").unwrap() {
            Some(UciCommand::Position { moves, .. }) => assert!(moves.is_empty()),
            other => panic!("Expected Position, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_position_fen() {
        let cmd = parse_command(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1 moves c7c5",
        )
        .unwrap();
        assert_eq!(
            cmd,
            Some(UciCommand::Position {
                source: PositionSource::Fen(
                    "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".to_string()
                ),
                moves: vec!["c7c5".to_string()],
            })
        );
    }

    #[test]
    fn test_position_requires_source() {
        let err = parse_command("position").unwrap_err();
        assert!(matches!(err, SessionError::MissingPositionSource(None)));

        let err = parse_command("position board 8/8/8/8/8/8/8/K6k w - - 0 1").unwrap_err();
        assert!(err.to_string().contains("startpos"));
    }

    #[test]
    fn test_parse_go() {
        assert_eq!(
            parse_command("go depth 5").unwrap(),
            Some(UciCommand::Go(GoParams { depth: Some(5) }))
        );
        assert_eq!(
            parse_command("go wtime 1000 btime 1000 depth 3").unwrap(),
            Some(UciCommand::Go(GoParams { depth: Some(3) }))
        );
        // depth 以外は無視し、前回の深さを使う
        assert_eq!(parse_command("go infinite").unwrap(), Some(UciCommand::Go(GoParams::default())));
        assert_eq!(parse_command("go").unwrap(), Some(UciCommand::Go(GoParams::default())));
        // 数値でなければ 0
        assert_eq!(
            parse_command("go depth x").unwrap(),
            Some(UciCommand::Go(GoParams { depth: Some(0) }))
        );
    }
}
