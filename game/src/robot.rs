// Robot movement.
//
// A round moves every robot two half-steps. Each half-step:
//   1. the program for the color under the robot gives a bias (right/left),
//   2. the cell ahead under that bias is inspected; if its color (or the
//      robot's own color when it is off the board) is the program's exception,
//      the bias flips for this half-step,
//   3. the robot steps to the cell ahead under the effective bias and turns
//      60 degrees, or, when that cell is off the board or taken by another
//      robot, stays put and turns 120 degrees.
// Turning is clockwise-negative: a right bias turns by -1 / -2 facings.

use msgs::{
    coord::{Coord, Facing, Pose},
    server_client_msg::RobotData,
    PlayerId,
};

use crate::{
    board::{self, Board, TRIANGLES},
    program::Programs,
};

/// Which half of a round's move reached a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HalfStep {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Robot {
    pub coord: Coord,
    pub facing: Facing,
    /// Pose after the first half-step of the last round, for animation.
    pub intermediate_pos: Option<Pose>,
}

impl Robot {
    pub fn new(coord: Coord, facing: Facing) -> Robot {
        Robot {
            coord,
            facing,
            intermediate_pos: None,
        }
    }

    /// The six robots on their home cells in the center hexagon.
    pub fn make6() -> Vec<Robot> {
        TRIANGLES
            .iter()
            .zip(0u8..)
            .filter_map(|(&(x, y), index)| Some(Robot::new(Coord::new(x, y), Facing::from_index(index)?)))
            .collect()
    }

    /// Moves two half-steps. Stops after the first one if it lands on a goal.
    pub fn take_turn(
        &mut self,
        board: &Board,
        programs: &Programs,
        occupied: &[Coord],
        goals: &[(PlayerId, Coord)],
    ) -> Option<(PlayerId, HalfStep)> {
        let first = self.move_once(board, programs, occupied, goals);
        self.intermediate_pos = Some(self.pose());
        if let Some(player) = first {
            return Some((player, HalfStep::First));
        }
        self.move_once(board, programs, occupied, goals)
            .map(|player| (player, HalfStep::Second))
    }

    /// One half-step. Returns the owner of the goal the robot ends up on.
    ///
    /// `occupied` holds the cells of every other robot.
    pub fn move_once(
        &mut self,
        board: &Board,
        programs: &Programs,
        occupied: &[Coord],
        goals: &[(PlayerId, Coord)],
    ) -> Option<PlayerId> {
        let here = board.get(self.coord)?;
        let program = &programs[here.index()];

        let ahead = board::step(self.coord, self.facing, program.is_right);
        let do_opposite = board.get(ahead).unwrap_or(here) == program.exception;
        let is_right = do_opposite != program.is_right;
        let target = board::step(self.coord, self.facing, is_right);

        if board.get(target).is_none() || occupied.contains(&target) {
            self.facing = self.facing.rotate(if is_right { -2 } else { 2 });
        } else {
            self.coord = target;
            self.facing = self.facing.rotate(if is_right { -1 } else { 1 });
        }

        goals
            .iter()
            .find(|(_, goal)| *goal == self.coord)
            .map(|(player, _)| *player)
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.coord, self.facing)
    }

    pub fn data(&self) -> RobotData {
        RobotData {
            x: self.coord.x,
            y: self.coord.y,
            facing: self.facing,
            intermediate_pos: self.intermediate_pos,
        }
    }
}
