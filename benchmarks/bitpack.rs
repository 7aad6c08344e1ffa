//! Benchmarks sub-byte index packing and unpacking.
use brunch::Bench;

use rowview::layout::{IndexDepth, IndexLayout, LayoutError};
use rowview::IndexRowMut;

struct Pack {
    depth: IndexDepth,
    width: u32,
}

impl Pack {
    fn name(&self) -> String {
        format!("bitpack({:?}, {})", self.depth, self.width)
    }

    fn prepare(self) -> Result<impl FnMut(), LayoutError> {
        let layout = IndexLayout::new(self.depth, self.width)?;
        let mut bytes = vec![0u8; layout.byte_len()];
        let range = u32::from(self.depth.max_index()) + 1;
        let values: Vec<u8> = (0..self.width).map(|at| (at % range) as u8).collect();

        Ok(move || {
            let mut row = IndexRowMut::with_layout(layout, &mut bytes)
                .expect("buffer sized from the layout");
            row.pack_from(&values);
            let sum: u32 = row.as_ref().iter().map(u32::from).sum();
            std::hint::black_box(sum);
        })
    }
}

fn main() {
    let tests = [
        Pack {
            depth: IndexDepth::One,
            width: 4096,
        },
        Pack {
            depth: IndexDepth::Four,
            width: 4096,
        },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(tests.map(|pack| {
        Bench::new(format!("rowview::index::{}", pack.name()))
            .run(pack.prepare().expect("Failed to setup benchmark"))
    }));
    benches.finish();
}
