//! Property tests for drawing through the memory transfer interface

use proptest::prelude::*;

use vgapio_core::generator::{Generator, InstructionBudget, INSTRUCTION_MEMORY_SIZE};
use vgapio_core::{Color, CpuTransfer, Framebuffer, MemoryTransfer, Screen, FRAMEBUFFER_LEN};

fn color() -> impl Strategy<Value = Color> {
    prop::sample::select(Color::ALL.to_vec())
}

fn boxed_frame(seed: u64) -> Box<[u8; FRAMEBUFFER_LEN]> {
    // Cheap xorshift so whole frames don't have to come out of proptest
    let mut state = seed | 1;
    let mut frame = Box::new([0u8; FRAMEBUFFER_LEN]);
    for b in frame.iter_mut() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        *b = (state & 0x7) as u8;
    }
    frame
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fill_screen_sets_every_pixel(c in color()) {
        let mut fb = Box::new(Framebuffer::new());
        Screen::new(&mut *fb, CpuTransfer).fill_screen(c);

        prop_assert!(fb.as_bytes().iter().all(|&b| b == c.pack()));
    }

    #[test]
    fn fill_screen_is_idempotent(c in color()) {
        let mut fb = Box::new(Framebuffer::new());
        let mut screen = Screen::new(&mut *fb, CpuTransfer);

        screen.fill_screen(c);
        let once: Vec<u8> = screen.framebuffer().as_bytes().to_vec();
        screen.fill_screen(c);

        prop_assert_eq!(&screen.framebuffer().as_bytes()[..], &once[..]);
    }

    #[test]
    fn fill_after_fill_keeps_only_the_last(a in color(), b in color()) {
        let mut fb = Box::new(Framebuffer::new());
        let mut screen = Screen::new(&mut *fb, CpuTransfer);

        screen.fill_screen(a);
        screen.fill_screen(b);

        prop_assert!(screen.framebuffer().as_bytes().iter().all(|&p| p == b.pack()));
    }

    #[test]
    fn draw_frame_makes_framebuffer_equal(seed in any::<u64>()) {
        let frame = boxed_frame(seed);
        let mut fb = Box::new(Framebuffer::new());
        Screen::new(&mut *fb, CpuTransfer).draw_frame(&frame);

        prop_assert_eq!(&fb.as_bytes()[..], &frame[..]);
    }

    #[test]
    fn second_draw_frame_wins(first in any::<u64>(), second in any::<u64>()) {
        let b1 = boxed_frame(first);
        let b2 = boxed_frame(second);
        let mut fb = Box::new(Framebuffer::new());
        let mut screen = Screen::new(&mut *fb, CpuTransfer);

        screen.draw_frame(&b1);
        screen.draw_frame(&b2);

        prop_assert_eq!(&screen.framebuffer().as_bytes()[..], &b2[..]);
    }

    #[test]
    fn frame_round_trips_through_the_framebuffer(seed in any::<u64>()) {
        let frame = boxed_frame(seed);
        let mut back = Box::new([0u8; FRAMEBUFFER_LEN]);
        let mut fb = Box::new(Framebuffer::new());
        let mut screen = Screen::new(&mut *fb, CpuTransfer);

        screen.draw_frame(&frame);
        screen.read_frame(&mut back);

        prop_assert_eq!(&back[..], &frame[..]);
        prop_assert_eq!(&screen.framebuffer().as_bytes()[..], &frame[..]);
    }

    #[test]
    fn fill_touches_only_the_region(
        len in 0usize..256,
        start in 0usize..256,
        value in any::<u8>(),
    ) {
        let mut buf = vec![0xEEu8; 512];
        let end = start + len;
        CpuTransfer.fill(&mut buf[start..end], value);

        prop_assert!(buf[start..end].iter().all(|&b| b == value));
        prop_assert!(buf[..start].iter().all(|&b| b == 0xEE));
        prop_assert!(buf[end..].iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn write_pixel_changes_one_byte(x in 0usize..400, y in 0usize..300, c in color()) {
        let mut fb = Box::new(Framebuffer::new());
        Screen::new(&mut *fb, CpuTransfer).write_pixel(x, y, c);

        let changed = fb.as_bytes().iter().filter(|&&b| b != 0).count();
        match Framebuffer::index(x, y) {
            Some(i) => {
                prop_assert_eq!(fb.as_bytes()[i], c.pack());
                prop_assert!(changed <= 1);
            }
            None => prop_assert_eq!(changed, 0),
        }
    }

    #[test]
    fn budget_outcome_is_deterministic(
        lens in prop::collection::vec(0usize..20, 1..=4),
    ) {
        let programs: Vec<(Generator, usize)> = Generator::ALL
            .iter()
            .copied()
            .zip(lens.iter().copied())
            .collect();

        let first = InstructionBudget::check(&programs);
        prop_assert_eq!(InstructionBudget::check(&programs), first);

        let total: usize = programs.iter().map(|&(_, n)| n).sum();
        prop_assert_eq!(first.is_ok(), total <= INSTRUCTION_MEMORY_SIZE);
        if let Ok(used) = first {
            prop_assert_eq!(used, total);
        }
    }
}

#[test]
fn empty_regions_are_noops() {
    let mut fb = Box::new(Framebuffer::new());
    fb.set_pixel(3, 3, Color::Magenta);
    let before = fb.as_bytes().to_vec();

    CpuTransfer.fill(&mut fb.as_bytes_mut()[10..10], Color::White.pack());
    CpuTransfer.copy(&mut fb.as_bytes_mut()[..0], &[]);

    assert_eq!(&fb.as_bytes()[..], &before[..]);
}
