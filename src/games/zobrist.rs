use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Zobrist board hashing
// * One number for each mark at each square ( 2 * 9 )
// * One number to indicate the second player is to move
// Total numbers: 2 * 9 + 1 = 19
//
// The hash of a position is the xor of the numbers for every occupied square, xor the
// side-to-move number when O is to move. Placing or removing a mark xors a single number,
// so the hash is updated incrementally as moves are applied and undone.

pub const SQUARES: usize = 9;
const MARKS: usize = 2;
const SIDE_TO_MOVE_INDEX: usize = SQUARES * MARKS;

// Keys are reproducible so that hashes (and therefore table buckets) are stable between
// runs.
const SEED: u64 = 0x7a0b_215e_ed00_c0de;

pub struct Zobrist {
    numbers: [u64; SIDE_TO_MOVE_INDEX + 1],
}

impl Zobrist {
    pub fn new() -> Self {
        Self {
            numbers: init_rand_numbers(),
        }
    }

    // nums 0..18: mark squares
    pub fn mark_square_num(&self, mark_index: usize, square: usize) -> u64 {
        self.numbers[square * MARKS + mark_index]
    }

    // num 18: second player to move
    pub fn second_player_num(&self) -> u64 {
        self.numbers[SIDE_TO_MOVE_INDEX]
    }
}

fn init_rand_numbers() -> [u64; SIDE_TO_MOVE_INDEX + 1] {
    let mut nums = [0; SIDE_TO_MOVE_INDEX + 1];
    let mut rng = StdRng::seed_from_u64(SEED);

    for num in nums.iter_mut() {
        *num = rng.gen();
    }

    nums
}
