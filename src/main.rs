use bollywood_dailies::game::connections::GROUP_SIZE;
use bollywood_dailies::game::share::{
    connections_share_text, face_mash_share_text, glimpsed_share_text, plot_fusion_share_text,
    ConnectionsShareData, DualEntityShareData, GlimpsedShareData,
};
use bollywood_dailies::game::{
    face_mash_puzzle, plot_fusion_puzzle, Clock, ConnectionsGame, CooldownTimers, CooldownTracker,
    DualEntityGameState, DualEntityPuzzle, EntityLookup, EntitySlot, FileStore, GameCatalog,
    GameStorage, GlimpsedGame, GuessOutcome, KeyValueStore, ProgressService, Settings, SystemClock,
};
use bollywood_dailies::model::{GameDefinition, GameType};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

const USAGE: &str = "usage: bollywood-dailies <connections|face-mash|plot-fusion|glimpsed> [--game ID] [--replay] [--wait]";

struct Args {
    game_type: Option<GameType>,
    game_id: Option<String>,
    replay: bool,
    wait: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        game_type: None,
        game_id: None,
        replay: false,
        wait: false,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--replay" => parsed.replay = true,
            "--wait" => parsed.wait = true,
            "--game" => {
                parsed.game_id = Some(args.next().ok_or("--game needs a game id")?);
            }
            slug => {
                let game_type =
                    GameType::from_slug(slug).ok_or_else(|| format!("unknown game {:?}", slug))?;
                parsed.game_type = Some(game_type);
            }
        }
    }
    if parsed.game_type.is_none() && parsed.game_id.is_none() {
        return Err("no game selected".to_string());
    }
    Ok(parsed)
}

/// Next line of input, `None` once stdin is closed.
fn prompt(input: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> Option<String> {
    print!("{} ", text);
    let _ = io::stdout().flush();
    input.next().and_then(Result::ok)
}

fn init_logging() {
    env_logger::init();
}

fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let settings = Settings::load();
    if Settings::is_debug_mode() {
        debug!("Settings: {:?}", settings);
    }

    let storage = Rc::new(GameStorage::new(FileStore::new(settings.data_dir())));
    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let progress = ProgressService::new(Rc::clone(&storage), Rc::clone(&clock));
    let tracker = CooldownTracker::new(Rc::clone(&storage), Rc::clone(&clock), settings.cooldown);
    let catalog = GameCatalog::builtin();

    let definition = match (&args.game_id, args.game_type) {
        (Some(game_id), _) => catalog.game_by_id(game_id),
        (None, Some(game_type)) => catalog.todays_game(game_type, clock.today()),
        (None, None) => None,
    };
    let Some(definition) = definition else {
        eprintln!("No puzzle available");
        return ExitCode::FAILURE;
    };
    let game_type = definition.game_type();
    let game_id = definition.id().to_string();
    info!("Playing {} ({})", definition.title(), game_id);

    if args.replay {
        progress.replay(&game_id, game_type, None);
    }

    if tracker.is_on_cooldown(game_type) {
        println!(
            "{} is on cooldown. Next game in {}.",
            game_type.title(),
            tracker.state(game_type).formatted
        );
        if let Some(summary) = progress.summary(&game_id) {
            println!("{}", summary.performance.summary);
        }
        if !args.wait {
            return ExitCode::SUCCESS;
        }
        wait_for_cooldown(&tracker, game_type, settings.cooldown_tick);
        progress.replay(&game_id, game_type, None);
    }

    println!("{}\n", definition.title());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let share_text = match definition {
        GameDefinition::Connections(data) => {
            play_connections(&ConnectionsGame::new(data), &progress, &mut lines, &settings)
        }
        GameDefinition::FaceMash(data) => {
            let puzzle = face_mash_puzzle(data);
            play_dual_entity(&puzzle, &progress, &catalog, &mut lines).map(|share| {
                face_mash_share_text(&share, &settings.share_url)
            })
        }
        GameDefinition::PlotFusion(data) => {
            println!("{}\n", data.fused_plot);
            let puzzle = plot_fusion_puzzle(data, &catalog);
            play_dual_entity(&puzzle, &progress, &catalog, &mut lines).map(|share| {
                plot_fusion_share_text(&share, &settings.share_url)
            })
        }
        GameDefinition::Glimpsed(data) => {
            play_glimpsed(&GlimpsedGame::new(data), &progress, &mut lines, &settings)
        }
    };

    let Some(share_text) = share_text else {
        println!("\nProgress saved. Come back to finish the puzzle.");
        return ExitCode::SUCCESS;
    };
    if let Some(summary) = progress.summary(&game_id) {
        println!("\n{}", summary.performance.summary);
    }
    println!("\n{}", share_text);
    ExitCode::SUCCESS
}

fn wait_for_cooldown<S: KeyValueStore + 'static>(
    tracker: &CooldownTracker<S>,
    game_type: GameType,
    tick: Duration,
) {
    let main_loop = glib::MainLoop::new(None, false);
    let timers = CooldownTimers::new(tick);
    let _handle = timers.start(tracker, game_type, {
        let main_loop = main_loop.clone();
        move |state| {
            if state.is_on_cooldown {
                print!("\r{} remaining ", state.formatted);
                let _ = io::stdout().flush();
            } else {
                println!();
                main_loop.quit();
            }
        }
    });
    main_loop.run();
}

fn play_connections<S: KeyValueStore>(
    game: &ConnectionsGame,
    progress: &ProgressService<S>,
    input: &mut impl Iterator<Item = io::Result<String>>,
    settings: &Settings,
) -> Option<String> {
    let mut rng = match Settings::seed_from_env() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut state = game.load(progress, &mut rng);

    while !state.game_completed {
        let tiles: Vec<&str> = state.remaining.iter().map(|tile| tile.item.as_str()).collect();
        println!("\n{}", tiles.join(" | "));
        println!("Mistakes remaining: {}", state.mistakes_remaining());

        let line = prompt(input, "Pick four, comma separated (or 'shuffle'):")?;
        if line.trim().eq_ignore_ascii_case("shuffle") {
            state = game.shuffle_remaining(&state, &mut rng);
            continue;
        }

        let mut selection = state.clone();
        selection.selected.clear();
        for item in line.split(',').map(str::trim).take(GROUP_SIZE) {
            match game.tile(item) {
                Some(tile) => selection = game.toggle(&selection, &tile.item),
                None => println!("{:?} is not on the board", item),
            }
        }

        match game.submit(&selection) {
            GuessOutcome::Accepted(submission) => {
                match (&submission.group_id, &submission.message) {
                    (Some(group_id), _) => {
                        let category = game
                            .data()
                            .groups
                            .iter()
                            .find(|group| &group.id == group_id)
                            .map_or("", |group| group.category.as_str());
                        println!("Correct! {}", category);
                    }
                    (None, Some(message)) => println!("{}", message),
                    (None, None) => {}
                }
                state = submission.state;
                game.save(progress, &state);
            }
            GuessOutcome::Rejected(reason) => println!("{}", reason),
        }
    }

    for group in &game.data().groups {
        println!("{}: {}", group.category, group.items.join(", "));
    }
    Some(connections_share_text(
        &ConnectionsShareData::new(&game.data().id, &state),
        &settings.share_url,
    ))
}

fn print_hints(puzzle: &DualEntityPuzzle, state: &DualEntityGameState) {
    for (label, slot) in [("1", EntitySlot::Entity1), ("2", EntitySlot::Entity2)] {
        let entity = state.entity(slot);
        if entity.found {
            println!("[{}] {} (found)", label, puzzle.entity(slot).name);
        } else {
            let hints = puzzle.visible_hints(state, slot);
            println!("[{}] hints: {}", label, hints.join(" / "));
        }
    }
}

fn play_dual_entity<S: KeyValueStore>(
    puzzle: &DualEntityPuzzle,
    progress: &ProgressService<S>,
    lookup: &dyn EntityLookup,
    input: &mut impl Iterator<Item = io::Result<String>>,
) -> Option<DualEntityShareData> {
    let mut state = puzzle.load(progress);

    while !state.game_completed {
        print_hints(puzzle, &state);
        let line = prompt(input, "Guess (prefix with 1: or 2: to pick a target):")?;
        let (target, guess) = match line.split_once(':') {
            Some(("1", guess)) => (Some(EntitySlot::Entity1), guess),
            Some(("2", guess)) => (Some(EntitySlot::Entity2), guess),
            _ => (None, line.as_str()),
        };
        let selected = puzzle.select_target(&state, target);

        match puzzle.process_guess(guess, &selected, lookup) {
            GuessOutcome::Accepted(result) => {
                if result.is_correct {
                    println!("Correct! {}", puzzle.entity(result.target).name);
                } else {
                    println!("Not quite.");
                }
                state = result.state;
                state.current_target = None;
                puzzle.save(progress, &state);
            }
            GuessOutcome::Rejected(reason) => println!("{}", reason),
        }
    }

    println!(
        "\nAnswers: {} and {}",
        puzzle.entity1.name, puzzle.entity2.name
    );
    Some(DualEntityShareData::new(&puzzle.game_id, &state))
}

fn play_glimpsed<S: KeyValueStore>(
    game: &GlimpsedGame,
    progress: &ProgressService<S>,
    input: &mut impl Iterator<Item = io::Result<String>>,
    settings: &Settings,
) -> Option<String> {
    let mut state = game.load(progress);

    while !state.game_completed {
        println!(
            "\nFrame {} of {}, {} guesses left",
            state.current_frame,
            game.data().total_frames,
            state.attempts_remaining()
        );
        let line = prompt(input, "Which movie is this?")?;
        match game.process_guess(&line, &state) {
            GuessOutcome::Accepted(next) => {
                if next.movie_found {
                    println!("Correct!");
                } else {
                    println!("Not quite.");
                }
                state = next;
                game.save(progress, &state);
            }
            GuessOutcome::Rejected(reason) => println!("{}", reason),
        }
    }

    println!("\nThe movie was {}", game.data().movie_name);
    Some(glimpsed_share_text(
        &GlimpsedShareData::new(&game.data().id, &state),
        &settings.share_url,
    ))
}
