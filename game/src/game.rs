// The game state machine and round resolver.
//
// States: waiting (accepting joins) -> playing (after `begin`) -> done (after
// a goal is reached) -> waiting again on `restart`. The roster survives
// restarts.
//
// Nothing here talks to the network. Every mutating call returns the list of
// notifications it produced as `Outbound` values addressed by `Recipient`;
// `Session` owns the player connections and delivers them.
//
// A round resolves as soon as every player in the roster has a buffered
// change. That condition is re-checked after every action and after every
// removal, so a departing player never leaves a round stalled.

use std::collections::BTreeMap;

use msgs::{
    change::Change,
    coord::Coord,
    join_error::JoinError,
    server_client_msg::{PlayerName, ServerClientMsg},
    PlayerId,
};
use tracing::info;

use crate::{
    board::Board,
    program::{Program, Programs},
    render,
    robot::{HalfStep, Robot},
};

pub const MAX_PLAYERS: usize = 6;

/// Goal cells by player count, handed out in join order.
const GOALS: [&[(i32, i32)]; MAX_PLAYERS] = [
    &[(-1, 3)],
    &[(-1, 3), (-1, -4)],
    &[(-1, 3), (-6, -2), (4, -2)],
    &[(-1, 3), (-6, 1), (-1, -4), (4, -2)],
    &[(-1, 3), (-6, 1), (-6, -2), (-1, -4), (4, -2)],
    &[(-1, 3), (-6, 1), (-6, -2), (-1, -4), (4, -2), (4, 1)],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    fn name_msg(&self) -> PlayerName {
        PlayerName { index: self.id, name: self.name.clone() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    All,
    Player (PlayerId),
    AllExcept (PlayerId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: Recipient,
    pub msg: ServerClientMsg,
}

impl Outbound {
    fn all(msg: ServerClientMsg) -> Outbound {
        Outbound { to: Recipient::All, msg }
    }

    fn to(player: PlayerId, msg: ServerClientMsg) -> Outbound {
        Outbound { to: Recipient::Player(player), msg }
    }

    fn all_except(player: PlayerId, msg: ServerClientMsg) -> Outbound {
        Outbound { to: Recipient::AllExcept(player), msg }
    }
}

/// Everything that only exists while a game is being played.
#[derive(Debug, Clone)]
struct Play {
    board: Board,
    robots: Vec<Robot>,
    programs: Programs,
    goals: Vec<(PlayerId, Coord)>,
}

#[derive(Debug)]
pub struct Game {
    code: String,
    /// Join order. The first player is the host.
    players: Vec<Player>,
    next_player_id: PlayerId,
    changes: BTreeMap<PlayerId, Change>,
    play: Option<Play>,
    is_done: bool,
    rounds_played: u32,
}

impl Game {
    /// Creates a game with its creator as the only (host) player.
    pub fn create(code: String) -> (Game, PlayerId, Vec<Outbound>) {
        let mut game = Game {
            code,
            players: Vec::new(),
            next_player_id: 0,
            changes: BTreeMap::new(),
            play: None,
            is_done: false,
            rounds_played: 0,
        };
        let (creator, mut outbound) = game.admit();
        outbound.push(Outbound::to(creator, ServerClientMsg::Code(game.code.clone())));
        (game, creator, outbound)
    }

    pub fn join(&mut self) -> Result<(PlayerId, Vec<Outbound>), JoinError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(JoinError::Full);
        }
        if self.is_started() {
            return Err(JoinError::AlreadyStarted);
        }
        Ok(self.admit())
    }

    fn admit(&mut self) -> (PlayerId, Vec<Outbound>) {
        let id = self.next_player_id;
        self.next_player_id += 1;
        let player = Player { id, name: format!("Player {}", id + 1) };

        let mut outbound: Vec<Outbound> = self
            .players
            .iter()
            .map(|other| Outbound::to(id, ServerClientMsg::Name(other.name_msg())))
            .collect();
        outbound.push(Outbound::all_except(id, ServerClientMsg::Name(player.name_msg())));
        outbound.push(Outbound::to(id, ServerClientMsg::YouAre(player.name_msg())));

        info!(code = %self.code, player = id, "player joined");
        self.players.push(player);
        (id, outbound)
    }

    /// Renames a player. Only allowed before the game starts.
    pub fn set_name(&mut self, id: PlayerId, name: String) -> Vec<Outbound> {
        if self.is_started() || name.is_empty() {
            return Vec::new();
        }
        let Some(player) = self.players.iter_mut().find(|player| player.id == id) else {
            return Vec::new();
        };
        player.name = name;
        vec![Outbound::all_except(id, ServerClientMsg::Name(player.name_msg()))]
    }

    /// Starts the game if `id` is the host.
    pub fn begin(&mut self, id: PlayerId) -> Vec<Outbound> {
        if self.host() != Some(id) {
            return Vec::new();
        }
        self.start()
    }

    pub fn start(&mut self) -> Vec<Outbound> {
        self.start_with(Board::generate(&mut rand::thread_rng()))
    }

    /// Starts the game on the given board. Does nothing if already started
    /// or nobody is here.
    pub fn start_with(&mut self, board: Board) -> Vec<Outbound> {
        if self.is_started() || self.players.is_empty() {
            return Vec::new();
        }

        let goals = self
            .players
            .iter()
            .zip(GOALS[self.players.len() - 1])
            .map(|(player, &(x, y))| (player.id, Coord::new(x, y)))
            .collect();
        let play = Play {
            board,
            robots: Robot::make6(),
            programs: Program::make3(),
            goals,
        };

        let outbound = vec![
            Outbound::all(ServerClientMsg::Board(render::board_svg(&play.board))),
            Outbound::all(ServerClientMsg::Robots(play.robots.iter().map(Robot::data).collect())),
            Outbound::all(ServerClientMsg::Programs(play.programs.iter().map(Program::data).collect())),
            Outbound::all(ServerClientMsg::Goals(play.goals.clone())),
        ];

        info!(code = %self.code, players = self.players.len(), "game started");
        self.changes.clear();
        self.is_done = false;
        self.play = Some(play);
        outbound
    }

    /// Buffers (or, for `None`, withdraws) a player's change for this round
    /// and resolves the round once everyone has one.
    ///
    /// The other players are told `ready` only when a change was buffered and
    /// the round is still open. Withdrawing a change sends nothing.
    pub fn action(&mut self, id: PlayerId, change: Option<Change>) -> Vec<Outbound> {
        if !self.is_started() || self.is_done || !self.has_player(id) {
            return Vec::new();
        }

        let is_valid = change.is_some();
        match change {
            Some(change) => {
                self.changes.insert(id, change);
            }
            None => {
                self.changes.remove(&id);
            }
        }

        if self.all_changes_in() {
            self.do_round()
        } else if is_valid {
            vec![Outbound::all_except(id, ServerClientMsg::Ready(id))]
        } else {
            Vec::new()
        }
    }

    /// Drops a player. Hands the host role on if needed and resolves the
    /// round if the remaining players are all ready.
    pub fn remove(&mut self, id: PlayerId) -> Vec<Outbound> {
        let Some(position) = self.players.iter().position(|player| player.id == id) else {
            return Vec::new();
        };
        self.players.remove(position);
        self.changes.remove(&id);
        if let Some(play) = self.play.as_mut() {
            play.goals.retain(|(owner, _)| *owner != id);
        }
        info!(code = %self.code, player = id, "player left");

        let mut outbound = vec![Outbound::all(ServerClientMsg::Remove(id))];
        if position == 0 {
            if let Some(host) = self.players.first() {
                info!(code = %self.code, player = host.id, "host promoted");
                outbound.push(Outbound::to(host.id, ServerClientMsg::Host));
            }
        }

        if self.is_started() && !self.is_done && self.all_changes_in() {
            outbound.extend(self.do_round());
        }
        outbound
    }

    /// Back to the lobby with the same roster. Host only, once the game is
    /// over.
    pub fn restart(&mut self, id: PlayerId) -> Vec<Outbound> {
        if self.host() != Some(id) || !self.is_done {
            return Vec::new();
        }
        self.play = None;
        self.is_done = false;
        self.changes.clear();
        info!(code = %self.code, "game restarted");
        vec![Outbound::all(ServerClientMsg::Restart)]
    }

    fn all_changes_in(&self) -> bool {
        !self.players.is_empty() && self.changes.len() == self.players.len()
    }

    fn do_round(&mut self) -> Vec<Outbound> {
        let Some(play) = self.play.as_mut() else {
            unreachable!("round resolved before the game started");
        };

        for program in play.programs.iter_mut() {
            program.apply_consensus(self.changes.values());
        }

        let mut reached = Vec::new();
        for index in 0..play.robots.len() {
            let occupied: Vec<Coord> = play
                .robots
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, robot)| robot.coord)
                .collect();
            if let Some(win) = play.robots[index].take_turn(&play.board, &play.programs, &occupied, &play.goals) {
                reached.push(win);
            }
        }
        let winners = earliest_winners(&reached);

        let changes = self
            .players
            .iter()
            .map(|player| (player.id, self.changes.get(&player.id).copied()))
            .collect();
        let mut outbound = vec![
            Outbound::all(ServerClientMsg::Changes(changes)),
            Outbound::all(ServerClientMsg::Robots(play.robots.iter().map(Robot::data).collect())),
            Outbound::all(ServerClientMsg::Programs(play.programs.iter().map(Program::data).collect())),
        ];

        self.rounds_played += 1;
        info!(code = %self.code, round = self.rounds_played, ?winners, "round resolved");

        if !winners.is_empty() {
            self.is_done = true;
            outbound.push(Outbound::all(ServerClientMsg::Winners(winners)));
        }
        self.changes.clear();
        outbound
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        self.players.iter().any(|player| player.id == id)
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.players.first().map(|player| player.id)
    }

    pub fn is_started(&self) -> bool {
        self.play.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    pub fn robots(&self) -> &[Robot] {
        match &self.play {
            Some(play) => &play.robots,
            None => &[],
        }
    }

    pub fn programs(&self) -> Option<&Programs> {
        self.play.as_ref().map(|play| &play.programs)
    }

    pub fn goals(&self) -> &[(PlayerId, Coord)] {
        match &self.play {
            Some(play) => &play.goals,
            None => &[],
        }
    }
}

/// Keeps only the winners who got there in the earliest half-step. Everyone
/// tied on that half-step wins.
pub fn earliest_winners(reached: &[(PlayerId, HalfStep)]) -> Vec<PlayerId> {
    let Some(earliest) = reached.iter().map(|(_, step)| *step).min() else {
        return Vec::new();
    };
    reached
        .iter()
        .filter(|(_, step)| *step == earliest)
        .map(|(player, _)| *player)
        .collect()
}

#[cfg(test)]
mod tests {
    use msgs::{color::Color, coord::{Facing, Pose}};

    use super::*;
    use crate::board::tests::fixture;

    fn game_with(players: usize) -> Game {
        let (mut game, _, _) = Game::create("test-code".into());
        for _ in 1..players {
            game.join().unwrap();
        }
        game
    }

    fn started(players: usize) -> Game {
        let mut game = game_with(players);
        game.start_with(fixture());
        game
    }

    fn msgs_to(outbound: &[Outbound], to: Recipient) -> Vec<&ServerClientMsg> {
        outbound.iter().filter(|o| o.to == to).map(|o| &o.msg).collect()
    }

    fn has_type(outbound: &[Outbound], msg_type: &str) -> bool {
        outbound.iter().any(|o| o.msg.msg_type() == msg_type)
    }

    fn pose(x: i32, y: i32, facing: u8) -> Pose {
        Pose::new(Coord::new(x, y), Facing::from_index(facing).unwrap())
    }

    #[test]
    fn creator_learns_slot_then_code() {
        let (game, creator, outbound) = Game::create("abc".into());
        assert_eq!(creator, 0);
        assert_eq!(game.host(), Some(0));
        assert_eq!(msgs_to(&outbound, Recipient::Player(0)), vec![
            &ServerClientMsg::YouAre(PlayerName { index: 0, name: "Player 1".into() }),
            &ServerClientMsg::Code("abc".into()),
        ]);
    }

    #[test]
    fn join_up_to_six_then_full() {
        let mut game = game_with(1);
        for expected in 1..6 {
            let (id, _) = game.join().unwrap();
            assert_eq!(id, expected);
        }
        assert_eq!(game.join().unwrap_err(), JoinError::Full);
        assert_eq!(game.players().len(), 6);
    }

    #[test]
    fn join_after_start_is_refused() {
        for players in 1..=5 {
            let mut game = started(players);
            assert_eq!(game.join().unwrap_err(), JoinError::AlreadyStarted);
        }
        let mut game = started(6);
        assert_eq!(game.join().unwrap_err(), JoinError::Full);
    }

    #[test]
    fn join_exchanges_names() {
        let mut game = game_with(2);
        let (id, outbound) = game.join().unwrap();
        assert_eq!(id, 2);
        assert_eq!(msgs_to(&outbound, Recipient::Player(2)), vec![
            &ServerClientMsg::Name(PlayerName { index: 0, name: "Player 1".into() }),
            &ServerClientMsg::Name(PlayerName { index: 1, name: "Player 2".into() }),
            &ServerClientMsg::YouAre(PlayerName { index: 2, name: "Player 3".into() }),
        ]);
        assert_eq!(msgs_to(&outbound, Recipient::AllExcept(2)), vec![
            &ServerClientMsg::Name(PlayerName { index: 2, name: "Player 3".into() }),
        ]);
    }

    #[test]
    fn collections_empty_until_started() {
        let mut game = game_with(2);
        assert!(game.robots().is_empty());
        assert!(game.programs().is_none());
        assert!(game.goals().is_empty());

        let outbound = game.start_with(fixture());
        assert_eq!(game.robots().len(), 6);
        assert!(game.programs().is_some());
        assert_eq!(game.goals(), &[(0, Coord::new(-1, 3)), (1, Coord::new(-1, -4))]);
        for msg_type in ["board", "robots", "programs", "goals"] {
            assert!(has_type(&outbound, msg_type), "{msg_type}");
        }
    }

    #[test]
    fn only_host_can_begin() {
        let mut game = game_with(2);
        assert!(game.begin(1).is_empty());
        assert!(!game.is_started());
        assert!(!game.begin(0).is_empty());
        assert!(game.is_started());
        assert!(game.begin(0).is_empty());
    }

    #[test]
    fn rename_only_before_start() {
        let mut game = game_with(2);
        let outbound = game.set_name(0, "Bob".into());
        assert_eq!(outbound, vec![Outbound::all_except(0, ServerClientMsg::Name(PlayerName { index: 0, name: "Bob".into() }))]);
        assert_eq!(game.players()[0].name, "Bob");

        game.start_with(fixture());
        assert!(game.set_name(0, "Alice".into()).is_empty());
        assert_eq!(game.players()[0].name, "Bob");
    }

    #[test]
    fn round_waits_for_every_player() {
        let mut game = started(2);
        let outbound = game.action(0, Some(Change::exception(Color::Red, Color::Green)));
        assert_eq!(game.rounds_played(), 0);
        assert_eq!(outbound, vec![Outbound::all_except(0, ServerClientMsg::Ready(0))]);

        let outbound = game.action(1, Some(Change::direction(Color::Green, true)));
        assert_eq!(game.rounds_played(), 1);
        assert_eq!(msgs_to(&outbound, Recipient::All)[0], &ServerClientMsg::Changes(vec![
            (0, Some(Change::exception(Color::Red, Color::Green))),
            (1, Some(Change::direction(Color::Green, true))),
        ]));
        assert_eq!(game.pending_changes(), 0);
    }

    #[test]
    fn invalid_action_withdraws_change() {
        let mut game = started(2);
        game.action(0, Some(Change::exception(Color::Red, Color::Green)));
        assert!(game.action(0, None).is_empty());
        assert_eq!(game.pending_changes(), 0);

        game.action(0, Some(Change::direction(Color::Blue, false)));
        assert_eq!(game.pending_changes(), 1);
        game.action(1, None);
        assert_eq!(game.rounds_played(), 0);
    }

    #[test]
    fn later_action_replaces_earlier() {
        let mut game = started(2);
        game.action(0, Some(Change::direction(Color::Red, false)));
        game.action(0, Some(Change::direction(Color::Red, true)));
        assert_eq!(game.pending_changes(), 1);
        game.action(1, Some(Change::direction(Color::Blue, false)));
        let programs = game.programs().unwrap();
        assert!(programs[Color::Red.index()].is_right);
        assert!(!programs[Color::Blue.index()].is_right);
    }

    #[test]
    fn actions_ignored_before_start() {
        let mut game = game_with(1);
        assert!(game.action(0, Some(Change::direction(Color::Red, false))).is_empty());
        assert_eq!(game.pending_changes(), 0);
    }

    #[test]
    fn round_moves_robots_on_fixture_board() {
        let mut game = started(2);
        {
            let play = game.play.as_mut().unwrap();
            play.programs[0].exception = Color::Green;
            play.programs[0].is_right = true;
            play.programs[1].exception = Color::Green;
            play.programs[1].is_right = false;
            play.programs[2].exception = Color::Blue;
            play.programs[2].is_right = true;
        }
        game.changes.insert(0, Change::exception(Color::Blue, Color::Blue));
        game.changes.insert(1, Change::direction(Color::Blue, true));
        let outbound = game.do_round();

        let poses: Vec<Pose> = game.robots().iter().map(Robot::pose).collect();
        assert_eq!(poses, vec![
            pose(-1, 0, 0),
            pose(0, 0, 5),
            pose(2, -1, 0),
            pose(-1, -1, 3),
            pose(-2, -1, 4),
            pose(-2, 0, 3),
        ]);
        assert_eq!(game.robots()[2].intermediate_pos, Some(pose(1, -1, 1)));
        assert!(!has_type(&outbound, "winners"));
        assert!(!game.is_done());
    }

    #[test]
    fn round_always_clears_changes() {
        let mut game = started(1);
        game.action(0, Some(Change::direction(Color::Red, true)));
        assert_eq!(game.pending_changes(), 0);
        assert_eq!(game.rounds_played(), 1);
    }

    #[test]
    fn first_half_step_winners_tie() {
        // With default programs on the fixture, robot 3 reaches (-1, -2) and
        // robot 5 reaches (-3, 0) on their first half-steps.
        let mut game = started(2);
        game.play.as_mut().unwrap().goals = vec![(0, Coord::new(-1, -2)), (1, Coord::new(-3, 0))];
        game.changes.insert(0, Change::direction(Color::Red, true));
        game.changes.insert(1, Change::direction(Color::Red, true));

        let outbound = game.do_round();
        assert!(outbound.contains(&Outbound::all(ServerClientMsg::Winners(vec![0, 1]))));
        assert!(game.is_done());
        assert_eq!(game.pending_changes(), 0);
    }

    #[test]
    fn first_half_step_beats_second() {
        // Robot 3 reaches (-1, -2) on its first half-step, robot 5 reaches
        // (-3, 1) only on its second.
        let mut game = started(2);
        game.play.as_mut().unwrap().goals = vec![(0, Coord::new(-3, 1)), (1, Coord::new(-1, -2))];
        game.changes.insert(0, Change::direction(Color::Red, true));
        game.changes.insert(1, Change::direction(Color::Red, true));

        let outbound = game.do_round();
        assert!(outbound.contains(&Outbound::all(ServerClientMsg::Winners(vec![1]))));
        assert_eq!(game.robots()[5].pose(), pose(-3, 1, 5));
    }

    #[test]
    fn earliest_step_filter() {
        use HalfStep::*;
        assert_eq!(earliest_winners(&[]), Vec::<PlayerId>::new());
        assert_eq!(earliest_winners(&[(1, Second), (0, Second)]), vec![1, 0]);
        assert_eq!(earliest_winners(&[(0, Second), (1, First)]), vec![1]);
        assert_eq!(earliest_winners(&[(2, First), (0, Second), (1, First)]), vec![2, 1]);
    }

    #[test]
    fn no_rounds_after_done() {
        let mut game = started(1);
        game.is_done = true;
        assert!(game.action(0, Some(Change::direction(Color::Red, true))).is_empty());
        assert_eq!(game.rounds_played(), 0);
    }

    #[test]
    fn removing_host_promotes_next_player() {
        let mut game = game_with(3);
        let outbound = game.remove(0);
        assert_eq!(outbound, vec![
            Outbound::all(ServerClientMsg::Remove(0)),
            Outbound::to(1, ServerClientMsg::Host),
        ]);
        assert_eq!(game.host(), Some(1));
    }

    #[test]
    fn removing_other_player_keeps_host() {
        let mut game = game_with(3);
        let outbound = game.remove(1);
        assert_eq!(outbound, vec![Outbound::all(ServerClientMsg::Remove(1))]);
        assert_eq!(game.host(), Some(0));
        assert!(game.remove(1).is_empty());
    }

    #[test]
    fn slots_are_not_reused() {
        let mut game = game_with(3);
        game.remove(1);
        let (id, _) = game.join().unwrap();
        assert_eq!(id, 3);
    }

    #[test]
    fn removal_drops_goal_and_change() {
        let mut game = started(3);
        game.action(1, Some(Change::direction(Color::Red, true)));
        game.remove(1);
        assert_eq!(game.pending_changes(), 0);
        assert_eq!(game.goals(), &[(0, Coord::new(-1, 3)), (2, Coord::new(4, -2))]);
    }

    #[test]
    fn removal_resolves_stalled_round() {
        let mut game = started(3);
        game.action(0, Some(Change::direction(Color::Red, true)));
        game.action(1, Some(Change::direction(Color::Red, true)));
        assert_eq!(game.rounds_played(), 0);

        let outbound = game.remove(2);
        assert_eq!(game.rounds_played(), 1);
        assert!(has_type(&outbound, "changes"));
        assert_eq!(game.pending_changes(), 0);
    }

    #[test]
    fn removing_last_player_resolves_nothing() {
        let mut game = started(1);
        game.remove(0);
        assert_eq!(game.rounds_played(), 0);
        assert!(game.players().is_empty());
    }

    #[test]
    fn restart_returns_to_lobby() {
        let mut game = started(2);
        assert!(game.restart(0).is_empty());

        game.is_done = true;
        assert!(game.restart(1).is_empty());
        assert_eq!(game.restart(0), vec![Outbound::all(ServerClientMsg::Restart)]);
        assert!(!game.is_started());
        assert!(!game.is_done());
        assert!(game.robots().is_empty());

        let (id, _) = game.join().unwrap();
        assert_eq!(id, 2);
        game.start_with(fixture());
        assert_eq!(game.goals().len(), 3);
    }
}
