//! Command handlers for CLI subcommands.

use std::path::{Path, PathBuf};

use jeopardy_core::{GameSession, Settings};
use jeopardy_models::{parse_points, Board, Category, OptionalBoard, Player, Question};
use jeopardy_persistence::{with_board_extension, PersistenceGateway};
use tracing::{debug, info};

use crate::cli::{Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands, settings: &Settings, gateway: &PersistenceGateway) -> Result<()> {
    match command {
        Commands::New { file, name } => cmd_new(settings, gateway, &file, name),
        Commands::Show { file, format } => cmd_show(settings, gateway, &file, format),
        Commands::AddCategory { file, name } => edit(settings, gateway, &file, |board| {
            if board.has_category(&name) {
                return Err(format!("Category already exists: {}", name).into());
            }
            board.add_categories([Category::new(name.clone())]);
            println!("Added category '{}'", name);
            Ok(())
        }),
        Commands::RemoveCategory { file, name } => edit(settings, gateway, &file, |board| {
            let id = find_category(board, &name)?.id().clone();
            board.remove_category(&id);
            println!("Removed category '{}'", name);
            Ok(())
        }),
        Commands::SwapCategories {
            file,
            first,
            second,
        } => edit(settings, gateway, &file, |board| {
            board.swap_categories(first, second)?;
            println!("Swapped categories {} and {}", first, second);
            Ok(())
        }),
        Commands::AddQuestion {
            file,
            category,
            prompt,
            answer,
            points,
        } => {
            // Reject bad input before touching the file.
            let points = parse_points(&points)?;
            edit(settings, gateway, &file, |board| {
                let column = find_category_mut(board, &category)?;
                column.add_questions([Question::new(prompt, answer, points)]);
                println!("Added {} point question to '{}'", points, category);
                Ok(())
            })
        }
        Commands::RemoveQuestion {
            file,
            category,
            row,
        } => edit(settings, gateway, &file, |board| {
            let column = find_category_mut(board, &category)?;
            let id = question_at(column, row)?.id().clone();
            column.remove_question(&id);
            println!("Removed question {} from '{}'", row, category);
            Ok(())
        }),
        Commands::Answer {
            file,
            category,
            row,
        } => edit(settings, gateway, &file, |board| {
            let column = find_category_mut(board, &category)?;
            let id = question_at(column, row)?.id().clone();
            if let Some(question) = column.question_mut(&id) {
                question.set_answered();
            }
            println!("Marked question {} in '{}' as answered", row, category);
            Ok(())
        }),
        Commands::AddPlayer { file, name } => edit(settings, gateway, &file, |board| {
            if board.player_by_name(&name).is_some() {
                return Err(format!("Player already exists: {}", name).into());
            }
            board.add_players([Player::new(name.clone())]);
            println!("Added player '{}'", name);
            Ok(())
        }),
        Commands::Score {
            file,
            player,
            delta,
        } => edit(settings, gateway, &file, |board| {
            let entry = board
                .player_by_name_mut(&player)
                .ok_or_else(|| format!("Player not found: {}", player))?;
            entry.incr_score(delta);
            println!("{}", entry);
            Ok(())
        }),
        Commands::ResetScores { file } => edit(settings, gateway, &file, |board| {
            board.reset_scores();
            println!("Reset {} player score(s)", board.players().len());
            Ok(())
        }),
        Commands::Config => cmd_config(settings),
    }
}

fn cmd_new(
    settings: &Settings,
    gateway: &PersistenceGateway,
    file: &Path,
    name: Option<String>,
) -> Result<()> {
    let path = with_board_extension(&settings.resolve_board_path(file));
    if path.exists() {
        return Err(format!("Board file already exists: {}", path.display()).into());
    }

    let name = name
        .or_else(|| {
            file.file_stem()
                .and_then(|n| n.to_str())
                .map(String::from)
        })
        .unwrap_or_else(|| "Untitled".to_string());

    let mut session = watched_session();
    session.new_board(name.clone())?;
    let written = session.save_board_to_path(gateway, &path)?;

    println!("Created board '{}' at {}", name, written.display());
    Ok(())
}

fn cmd_show(
    settings: &Settings,
    gateway: &PersistenceGateway,
    file: &Path,
    format: OutputFormat,
) -> Result<()> {
    let (session, _) = open(settings, gateway, file)?;
    let board = session.current_board().ok_or("no board is open")?;

    match format {
        OutputFormat::Table => print!("{}", render_table(board)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(board)?),
        OutputFormat::Brief => println!(
            "{}: {} categories, {} rows, {} players",
            board.name,
            board.width(),
            board.height(),
            board.players().len()
        ),
    }
    Ok(())
}

fn cmd_config(settings: &Settings) -> Result<()> {
    println!("Border color: {}", settings.border_color);
    println!("Board dir:    {}", settings.board_dir.display());
    Ok(())
}

/// Renders a board as plain text, one block per category.
pub fn render_table(board: &Board) -> String {
    let mut out = format!(
        "{} ({} categories, {} rows, max {} pts)\n",
        board.name,
        board.width(),
        board.height(),
        board.max_points()
    );

    for (i, category) in board.categories().iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", i, category.name));
        for (row, question) in category.questions().iter().enumerate() {
            let marker = if question.is_answered() { "*" } else { " " };
            out.push_str(&format!(
                "  {}{:>2} {:>6}  {} -> {}\n",
                marker,
                row,
                question.points(),
                question.prompt(),
                question.answer()
            ));
        }
    }

    if !board.players().is_empty() {
        out.push_str("Players:\n");
        for player in board.players() {
            out.push_str(&format!("  {}\n", player));
        }
    }
    out
}

/// A session whose observer logs every change.
fn watched_session() -> GameSession {
    let mut session = GameSession::new();
    session.register_observer(|board| {
        debug!(
            width = board.width(),
            height = board.height(),
            max_points = board.max_points(),
            "Board changed"
        );
        Ok(())
    });
    session
}

/// Resolves the file to read a board from.
///
/// The `.jpdy` file wins. A file under the name as given is only read
/// until the first save creates its `.jpdy` counterpart.
fn locate(settings: &Settings, file: &Path) -> PathBuf {
    let path = settings.resolve_board_path(file);
    let board_file = with_board_extension(&path);
    if !board_file.exists() && path.exists() {
        path
    } else {
        board_file
    }
}

/// Loads a board into a fresh session. Also returns the `.jpdy` path that
/// saves go to.
fn open(
    settings: &Settings,
    gateway: &PersistenceGateway,
    file: &Path,
) -> Result<(GameSession, PathBuf)> {
    let source = locate(settings, file);
    let mut session = watched_session();
    session.load_board_from_path(gateway, &source)?;
    let target = with_board_extension(&settings.resolve_board_path(file));
    Ok((session, target))
}

/// Loads the board, applies `change`, and saves it back.
///
/// Nothing is written if `change` fails.
fn edit(
    settings: &Settings,
    gateway: &PersistenceGateway,
    file: &Path,
    change: impl FnOnce(&mut Board) -> Result<()>,
) -> Result<()> {
    let (mut session, path) = open(settings, gateway, file)?;
    session.update(change)?.ok_or("no board is open")??;
    let written = session.save_board_to_path(gateway, &path)?;
    info!(path = %written.display(), "Board updated");
    Ok(())
}

fn find_category<'a>(board: &'a Board, name: &str) -> Result<&'a Category> {
    board
        .category_by_name(name)
        .ok_or_else(|| format!("Category not found: {}", name).into())
}

fn find_category_mut<'a>(board: &'a mut Board, name: &str) -> Result<&'a mut Category> {
    board
        .category_by_name_mut(name)
        .ok_or_else(|| format!("Category not found: {}", name).into())
}

fn question_at(category: &Category, row: usize) -> Result<&Question> {
    category.questions().get(row).ok_or_else(|| {
        format!(
            "Row {} out of range; '{}' has {} question(s)",
            row,
            category.name,
            category.len()
        )
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeopardy_core::HexColor;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, Settings, PersistenceGateway) {
        let dir = tempdir().unwrap();
        let settings = Settings {
            border_color: HexColor {
                r: 0xb3,
                g: 0x1b,
                b: 0x1b,
            },
            board_dir: dir.path().to_path_buf(),
        };
        (dir, settings, PersistenceGateway::new())
    }

    fn run(settings: &Settings, gateway: &PersistenceGateway, command: Commands) -> Result<()> {
        execute(command, settings, gateway)
    }

    fn load(dir: &TempDir, gateway: &PersistenceGateway) -> Board {
        gateway
            .load_from_path(dir.path().join("night.jpdy"))
            .unwrap()
    }

    fn file() -> PathBuf {
        PathBuf::from("night")
    }

    fn add_question(category: &str, points: &str) -> Commands {
        Commands::AddQuestion {
            file: file(),
            category: category.to_string(),
            prompt: format!("{} for {}", category, points),
            answer: "answer".to_string(),
            points: points.to_string(),
        }
    }

    #[test]
    fn test_build_board_from_commands() {
        let (dir, settings, gateway) = setup();

        run(&settings, &gateway, Commands::New { file: file(), name: None }).unwrap();
        for name in ["Science", "History"] {
            let cmd = Commands::AddCategory {
                file: file(),
                name: name.to_string(),
            };
            run(&settings, &gateway, cmd).unwrap();
        }
        for points in ["300", "100", "200"] {
            run(&settings, &gateway, add_question("Science", points)).unwrap();
        }
        run(&settings, &gateway, add_question("History", "500")).unwrap();
        run(
            &settings,
            &gateway,
            Commands::AddPlayer {
                file: file(),
                name: "Joey".to_string(),
            },
        )
        .unwrap();
        run(
            &settings,
            &gateway,
            Commands::Score {
                file: file(),
                player: "Joey".to_string(),
                delta: 500,
            },
        )
        .unwrap();

        let board = load(&dir, &gateway);
        assert_eq!(board.name, "night");
        assert_eq!(board.width(), 2);
        assert_eq!(board.height(), 4);
        let points: Vec<_> = board.categories()[0]
            .questions()
            .iter()
            .map(Question::points)
            .collect();
        assert_eq!(points, vec![100, 200, 300]);
        assert_eq!(board.players()[0].to_string(), "Joey: 500");
    }

    #[test]
    fn test_swap_and_remove() {
        let (dir, settings, gateway) = setup();
        run(&settings, &gateway, Commands::New { file: file(), name: None }).unwrap();
        for name in ["A", "B", "C"] {
            let cmd = Commands::AddCategory {
                file: file(),
                name: name.to_string(),
            };
            run(&settings, &gateway, cmd).unwrap();
        }

        let swap = Commands::SwapCategories {
            file: file(),
            first: 0,
            second: 1,
        };
        run(&settings, &gateway, swap).unwrap();

        let bad_swap = Commands::SwapCategories {
            file: file(),
            first: 0,
            second: 3,
        };
        assert!(run(&settings, &gateway, bad_swap).is_err());

        let remove = Commands::RemoveCategory {
            file: file(),
            name: "C".to_string(),
        };
        run(&settings, &gateway, remove).unwrap();

        let board = load(&dir, &gateway);
        let names: Vec<_> = board.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_invalid_points_leave_file_untouched() {
        let (dir, settings, gateway) = setup();
        run(&settings, &gateway, Commands::New { file: file(), name: None }).unwrap();
        let cmd = Commands::AddCategory {
            file: file(),
            name: "Science".to_string(),
        };
        run(&settings, &gateway, cmd).unwrap();
        let before = std::fs::read_to_string(dir.path().join("night.jpdy")).unwrap();

        let err = run(&settings, &gateway, add_question("Science", "ten")).unwrap_err();

        assert!(err.to_string().contains("invalid point value"));
        let after = std::fs::read_to_string(dir.path().join("night.jpdy")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_answer_and_remove_question() {
        let (dir, settings, gateway) = setup();
        run(&settings, &gateway, Commands::New { file: file(), name: None }).unwrap();
        let cmd = Commands::AddCategory {
            file: file(),
            name: "Science".to_string(),
        };
        run(&settings, &gateway, cmd).unwrap();
        run(&settings, &gateway, add_question("Science", "100")).unwrap();
        run(&settings, &gateway, add_question("Science", "200")).unwrap();

        let answer = Commands::Answer {
            file: file(),
            category: "Science".to_string(),
            row: 1,
        };
        run(&settings, &gateway, answer).unwrap();
        let remove = Commands::RemoveQuestion {
            file: file(),
            category: "Science".to_string(),
            row: 0,
        };
        run(&settings, &gateway, remove).unwrap();
        let out_of_range = Commands::RemoveQuestion {
            file: file(),
            category: "Science".to_string(),
            row: 5,
        };
        assert!(run(&settings, &gateway, out_of_range).is_err());

        let board = load(&dir, &gateway);
        let questions = board.categories()[0].questions();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].points(), 200);
        assert!(questions[0].is_answered());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let (_dir, settings, gateway) = setup();
        run(&settings, &gateway, Commands::New { file: file(), name: None }).unwrap();
        assert!(run(&settings, &gateway, Commands::New { file: file(), name: None }).is_err());

        let cmd = || Commands::AddCategory {
            file: file(),
            name: "Science".to_string(),
        };
        run(&settings, &gateway, cmd()).unwrap();
        assert!(run(&settings, &gateway, cmd()).is_err());
    }

    #[test]
    fn test_reset_scores() {
        let (dir, settings, gateway) = setup();
        run(&settings, &gateway, Commands::New { file: file(), name: None }).unwrap();
        let add = Commands::AddPlayer {
            file: file(),
            name: "Ana".to_string(),
        };
        run(&settings, &gateway, add).unwrap();
        let score = Commands::Score {
            file: file(),
            player: "Ana".to_string(),
            delta: -300,
        };
        run(&settings, &gateway, score).unwrap();
        run(&settings, &gateway, Commands::ResetScores { file: file() }).unwrap();

        assert_eq!(load(&dir, &gateway).players()[0].score(), 0);
    }

    #[test]
    fn test_render_table() {
        let mut science = Category::new("Science");
        let mut played = Question::new("Red planet", "Mars", 100);
        played.set_answered();
        science.add_questions([played, Question::new("H2O", "Water", 200)]);
        let mut board = Board::new("Night");
        board.add_categories([science]);
        board.add_players([Player::new("Joey")]);

        let table = render_table(&board);

        assert_eq!(
            table,
            "Night (1 categories, 3 rows, max 200 pts)\n\
             [0] Science\n  \
             * 0    100  Red planet -> Mars\n  \
             \u{20} 1    200  H2O -> Water\n\
             Players:\n  \
             Joey: 0\n"
        );
    }

    #[test]
    fn test_edits_to_plain_json_file_accumulate() {
        let (dir, settings, gateway) = setup();
        let plain = dir.path().join("round1.json");
        let sink = std::fs::File::create(&plain).unwrap();
        gateway.save(sink, &Board::new("round1")).unwrap();

        for name in ["A", "B"] {
            let cmd = Commands::AddCategory {
                file: PathBuf::from("round1.json"),
                name: name.to_string(),
            };
            run(&settings, &gateway, cmd).unwrap();
        }

        let board: Board = gateway
            .load_from_path(dir.path().join("round1.json.jpdy"))
            .unwrap();
        let names: Vec<_> = board.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(
            locate(&settings, Path::new("round1.json")),
            dir.path().join("round1.json.jpdy")
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let (_dir, settings, gateway) = setup();
        let cmd = Commands::Show {
            file: file(),
            format: OutputFormat::Brief,
        };
        assert!(run(&settings, &gateway, cmd).is_err());
    }
}
