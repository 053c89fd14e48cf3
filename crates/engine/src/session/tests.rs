use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::state::{MemoryStore, StorageError, CACHE_MEMENTOS_KEY, PLAYER_POSITION_KEY};

const HOME: GridAddress = GridAddress::new(0, 0);

fn scenario_luck(key: &str) -> f64 {
    match key {
        "0,0" => 0.05,
        "0,0,initialValue" => 0.23,
        _ => 0.9,
    }
}

fn scenario_config() -> WorldConfig {
    WorldConfig {
        grid_origin: GeoPoint::new(0.0, 0.0),
        player_start: GeoPoint::new(0.00005, 0.00005),
        ..WorldConfig::default()
    }
}

fn start_scenario(store: Box<dyn KeyValueStore>) -> GeoSession {
    GeoSession::start_with(
        scenario_config(),
        store,
        Box::new(scenario_luck),
        Box::new(NullView),
    )
    .expect("session starts")
}

fn visible_snapshot(session: &GeoSession) -> Vec<(GridAddress, Vec<Coin>)> {
    session
        .visible_caches()
        .map(|cell| (cell.address, cell.coins.clone()))
        .collect()
}

#[derive(Clone, Default)]
struct CountingStore {
    inner: MemoryStore,
    saves: Rc<RefCell<usize>>,
}

impl KeyValueStore for CountingStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        *self.saves.borrow_mut() += 1;
        self.inner.save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }

    fn save(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingView {
    events: Rc<RefCell<Vec<String>>>,
}

impl CacheView for RecordingView {
    fn caches_cleared(&mut self) {
        self.events.borrow_mut().push("cleared".to_string());
    }

    fn cache_materialized(&mut self, cell: &Cell) {
        self.events
            .borrow_mut()
            .push(format!("materialized {} {}", cell.address, cell.value()));
    }

    fn cache_changed(&mut self, cell: &Cell) {
        self.events
            .borrow_mut()
            .push(format!("changed {} {}", cell.address, cell.value()));
    }

    fn player_moved(&mut self, _position: GeoPoint, history: &[GeoPoint]) {
        self.events
            .borrow_mut()
            .push(format!("moved {}", history.len()));
    }
}

#[test]
fn home_cache_spawns_with_twenty_three_coins() {
    let session = start_scenario(Box::new(MemoryStore::new()));
    let caches = visible_snapshot(&session);
    assert_eq!(caches.len(), 1);
    let (address, coins) = &caches[0];
    assert_eq!(*address, HOME);
    let serials = coins.iter().map(|coin| coin.serial).collect::<Vec<_>>();
    assert_eq!(serials, (0..23).collect::<Vec<_>>());
}

#[test]
fn collect_then_deposit_returns_to_identical_state() {
    let mut session = start_scenario(Box::new(MemoryStore::new()));
    let before = visible_snapshot(&session);

    let collected = session.collect(HOME).expect("visible");
    assert_eq!(collected, TransferOutcome::Transferred(Coin::new(HOME, 22)));
    assert_eq!(session.points(), 1);
    assert_eq!(session.visible_cache(HOME).expect("home").value(), 22);
    assert_eq!(session.mementos().get(HOME).map(<[Coin]>::len), Some(22));

    let deposited = session.deposit(HOME).expect("visible");
    assert_eq!(deposited, collected);
    assert_eq!(session.points(), 0);
    assert_eq!(visible_snapshot(&session), before);
    assert_eq!(session.mementos().get(HOME), Some(&before[0].1[..]));
}

#[test]
fn walking_away_and_back_restores_the_memento() {
    let mut session = start_scenario(Box::new(MemoryStore::new()));
    session.collect(HOME).expect("visible");

    for _ in 0..9 {
        session.step(Direction::North);
    }
    assert_eq!(session.player_address(), GridAddress::new(9, 0));
    assert!(session.visible_cache(HOME).is_none());
    assert!(matches!(
        session.collect(HOME),
        Err(SessionError::CacheNotVisible { address }) if address == HOME
    ));

    for _ in 0..9 {
        session.step(Direction::South);
    }
    assert_eq!(session.player_address(), HOME);
    let home = session.visible_cache(HOME).expect("home visible again");
    assert_eq!(home.value(), 22);
    assert_eq!(home.top_coin(), Some(&Coin::new(HOME, 21)));
    assert_eq!(session.history().len(), 19);
}

#[test]
fn reload_reconstructs_caches_player_and_position() {
    let mut session = start_scenario(Box::new(MemoryStore::new()));
    session.collect(HOME).expect("visible");
    session.collect(HOME).expect("visible");
    session.step(Direction::East);
    let caches = visible_snapshot(&session);
    let coins = session.player_coins().to_vec();
    let position = session.position();
    let history = session.history().to_vec();

    let reloaded = start_scenario(session.into_store());
    assert_eq!(visible_snapshot(&reloaded), caches);
    assert_eq!(reloaded.player_coins(), &coins[..]);
    assert_eq!(reloaded.points(), 2);
    assert_eq!(reloaded.position(), position);
    assert_eq!(reloaded.history(), &history[..]);
}

#[test]
fn flyweight_handle_is_stable_across_regeneration() {
    let mut session = start_scenario(Box::new(MemoryStore::new()));
    let first = session.cell_handle(HOME).expect("handle");
    session.regenerate();
    session.step(Direction::West);
    session.step(Direction::East);
    assert_eq!(session.cell_handle(HOME), Some(first));
    assert_eq!(session.cell_handle(GridAddress::new(1, 1)), None);
}

#[test]
fn regenerating_twice_yields_identical_caches() {
    let config = WorldConfig {
        spawn_probability: 0.5,
        neighborhood_size: 3,
        ..WorldConfig::default()
    };
    let mut session =
        GeoSession::start(config, Box::new(MemoryStore::new())).expect("session starts");
    let first = visible_snapshot(&session);
    assert!(!first.is_empty());
    session.regenerate();
    assert_eq!(visible_snapshot(&session), first);
}

#[test]
fn generation_is_identical_across_independent_sessions() {
    let config = WorldConfig {
        spawn_probability: 0.3,
        neighborhood_size: 4,
        ..WorldConfig::default()
    };
    let a = GeoSession::start(config, Box::new(MemoryStore::new())).expect("a");
    let b = GeoSession::start(config, Box::new(MemoryStore::new())).expect("b");
    assert_eq!(visible_snapshot(&a), visible_snapshot(&b));
}

#[test]
fn transfers_conserve_coins() {
    let config = WorldConfig {
        spawn_probability: 0.5,
        neighborhood_size: 2,
        ..WorldConfig::default()
    };
    let mut session =
        GeoSession::start(config, Box::new(MemoryStore::new())).expect("session starts");
    let check = |session: &GeoSession| {
        assert_eq!(session.coin_census(), session.minted_total());
    };
    check(&session);

    let directions = [Direction::East, Direction::East, Direction::North, Direction::West];
    for (round, direction) in directions.into_iter().enumerate() {
        let addresses = session
            .visible_caches()
            .map(|cell| cell.address)
            .collect::<Vec<_>>();
        for (index, address) in addresses.iter().enumerate() {
            for _ in 0..(index % 3 + round) {
                session.collect(*address).expect("visible");
                check(&session);
            }
            if index % 2 == 1 {
                session.deposit(*address).expect("visible");
                check(&session);
            }
        }
        session.step(direction);
        check(&session);
    }
    assert!(session.points() > 0);
}

#[test]
fn empty_sources_do_not_write_to_storage() {
    let store = CountingStore::default();
    let saves = Rc::clone(&store.saves);
    let mut session = GeoSession::start_with(
        scenario_config(),
        Box::new(store),
        Box::new(|key: &str| match key {
            "0,0" | "0,0,initialValue" => 0.0,
            _ => 0.9,
        }),
        Box::new(NullView),
    )
    .expect("session starts");
    assert_eq!(session.visible_cache(HOME).expect("home").value(), 0);

    let before = *saves.borrow();
    assert_eq!(
        session.collect(HOME).expect("visible"),
        TransferOutcome::SourceEmpty
    );
    assert_eq!(
        session.deposit(HOME).expect("visible"),
        TransferOutcome::SourceEmpty
    );
    assert_eq!(*saves.borrow(), before);
}

#[test]
fn unavailable_storage_starts_from_defaults() {
    let session = start_scenario(Box::new(UnavailableStore));
    assert_eq!(session.points(), 0);
    assert_eq!(session.position(), scenario_config().player_start);
    assert_eq!(session.history(), &[scenario_config().player_start][..]);
    assert_eq!(session.visible_cache(HOME).expect("home").value(), 23);
}

#[test]
fn corrupt_memento_is_regenerated_fresh() {
    let mut store = MemoryStore::new();
    store
        .save(
            CACHE_MEMENTOS_KEY,
            r#"[{"i":0,"j":0,"coins":[{"origin":"broken"}]}]"#,
        )
        .expect("seed store");
    let session = start_scenario(Box::new(store));
    assert_eq!(session.visible_cache(HOME).expect("home").value(), 23);
}

#[test]
fn existing_memento_wins_over_spawn_roll() {
    let barren = GridAddress::new(1, 1);
    let mut mementos = MementoStore::default();
    mementos.set(barren, &[Coin::new(HOME, 22)]);
    let mut store = MemoryStore::new();
    store
        .save(CACHE_MEMENTOS_KEY, &mementos.to_json().expect("encode"))
        .expect("seed store");

    let mut session = start_scenario(Box::new(store));
    let cell = session.visible_cache(barren).expect("restored despite roll");
    assert_eq!(cell.coins, vec![Coin::new(HOME, 22)]);
    assert_eq!(
        session.collect(barren).expect("visible"),
        TransferOutcome::Transferred(Coin::new(HOME, 22))
    );
}

#[test]
fn sensor_updates_apply_only_while_tracking() {
    let mut session = start_scenario(Box::new(MemoryStore::new()));
    let far = GeoPoint::new(0.01005, 0.00005);
    assert_eq!(session.sensor_update(far), SensorUpdate::Ignored);
    assert_eq!(session.player_address(), HOME);

    session.set_tracking(true);
    assert_eq!(session.tracking(), PositionTracking::Sensor);
    assert_eq!(session.sensor_update(far), SensorUpdate::Applied);
    assert_eq!(session.player_address(), GridAddress::new(100, 0));
    assert!(session.visible_cache(HOME).is_none());

    session.set_tracking(false);
    assert_eq!(
        session.sensor_update(scenario_config().player_start),
        SensorUpdate::Ignored
    );
    assert_eq!(session.player_address(), GridAddress::new(100, 0));
}

#[test]
fn off_grid_sensor_samples_are_rejected_without_side_effects() {
    let store = CountingStore::default();
    let saves = Rc::clone(&store.saves);
    let mut session = start_scenario(Box::new(store));
    session.set_tracking(true);
    let before = visible_snapshot(&session);
    let writes = *saves.borrow();

    for point in [
        GeoPoint::new(1e6, 0.0),
        GeoPoint::new(0.0, -1e6),
        GeoPoint::new(f64::INFINITY, 0.0),
        GeoPoint::new(f64::NAN, 0.0),
        GeoPoint::new(0.0, f64::NAN),
    ] {
        assert_eq!(session.sensor_update(point), SensorUpdate::Rejected);
    }

    assert_eq!(session.position(), scenario_config().player_start);
    assert_eq!(session.history(), &[scenario_config().player_start][..]);
    assert_eq!(visible_snapshot(&session), before);
    assert_eq!(*saves.borrow(), writes);
}

#[test]
fn saved_history_survives_a_rejected_nan_sample() {
    let mut session = start_scenario(Box::new(MemoryStore::new()));
    session.step(Direction::East);
    session.set_tracking(true);
    assert_eq!(
        session.sensor_update(GeoPoint::new(f64::NAN, f64::NAN)),
        SensorUpdate::Rejected
    );
    let history = session.history().to_vec();

    let reloaded = start_scenario(session.into_store());
    assert_eq!(reloaded.history(), &history[..]);
    assert_eq!(reloaded.player_address(), GridAddress::new(0, 1));
}

#[test]
fn off_grid_saved_position_falls_back_to_start() {
    let mut store = MemoryStore::new();
    store
        .save(PLAYER_POSITION_KEY, r#"{"lat":1e300,"lng":0.0}"#)
        .expect("seed store");
    let session = start_scenario(Box::new(store));
    assert_eq!(session.position(), scenario_config().player_start);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.visible_cache(HOME).expect("home").value(), 23);
}

#[test]
fn reset_forgets_progress_and_returns_to_start() {
    let mut session = start_scenario(Box::new(MemoryStore::new()));
    session.collect(HOME).expect("visible");
    session.collect(HOME).expect("visible");
    session.step(Direction::North);
    session.reset();

    assert_eq!(session.points(), 0);
    assert_eq!(session.position(), scenario_config().player_start);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.visible_cache(HOME).expect("home").value(), 23);

    let reloaded = start_scenario(session.into_store());
    assert_eq!(reloaded.points(), 0);
    assert_eq!(reloaded.visible_cache(HOME).expect("home").value(), 23);
}

#[test]
fn view_sees_each_regeneration_and_transfer() {
    let view = RecordingView::default();
    let events = Rc::clone(&view.events);
    let mut session = GeoSession::start_with(
        scenario_config(),
        Box::new(MemoryStore::new()),
        Box::new(scenario_luck),
        Box::new(view),
    )
    .expect("session starts");
    session.collect(HOME).expect("visible");

    assert_eq!(
        *events.borrow(),
        vec![
            "cleared".to_string(),
            "materialized 0,0 23".to_string(),
            "moved 1".to_string(),
            "changed 0,0 22".to_string(),
        ]
    );
}

#[test]
fn invalid_config_is_rejected() {
    let config = WorldConfig {
        spawn_probability: -0.1,
        ..WorldConfig::default()
    };
    let result = GeoSession::start(config, Box::new(MemoryStore::new()));
    assert!(matches!(result, Err(SessionError::Config(_))));
}

#[test]
fn configs_that_overflow_the_grid_are_rejected_before_start() {
    for config in [
        WorldConfig {
            tile_size_degrees: 1e-9,
            ..WorldConfig::default()
        },
        WorldConfig {
            neighborhood_size: u32::MAX,
            ..WorldConfig::default()
        },
    ] {
        let result = GeoSession::start(config, Box::new(MemoryStore::new()));
        assert!(matches!(result, Err(SessionError::Config(_))));
    }
}
