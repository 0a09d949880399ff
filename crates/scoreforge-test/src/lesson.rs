//! Timetabled lessons.
//!
//! Lessons occupy a room over a half-open interval `[start, end)`. Two
//! lessons conflict when they share a room and their intervals overlap.

use scoreforge_core::SimpleScore;

use crate::unique_pairs;

#[derive(Clone, Debug, PartialEq)]
pub struct Lesson {
    pub id: i64,
    pub room: u32,
    pub start: i64,
    pub end: i64,
}

impl Lesson {
    pub fn new(id: i64, room: u32, start: i64, end: i64) -> Self {
        Self {
            id,
            room,
            start,
            end,
        }
    }

    pub fn overlaps(&self, other: &Lesson) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Pairs of lessons sharing a room at the same time.
pub fn room_conflicts(lessons: &[Lesson]) -> i64 {
    unique_pairs(lessons)
        .filter(|(a, b)| a.room == b.room && a.overlaps(b))
        .count() as i64
}

/// Lessons with nothing else scheduled in their room.
pub fn lonely_lessons(lessons: &[Lesson]) -> i64 {
    lessons
        .iter()
        .filter(|a| !lessons.iter().any(|b| b.id != a.id && b.room == a.room))
        .count() as i64
}

pub fn score(lessons: &[Lesson]) -> SimpleScore {
    SimpleScore::of(-room_conflicts(lessons))
}
