/// Reconstructs a batch of synthetic Micromegas events and prints the cut
/// statistics together with a few accepted hits.
use anyhow::Result;
use mmreco::event::{Axis, AxisPair, Event, StripSample, Timestamp};
use mmreco::limits::ProportionLimits;
use mmreco::stats::CutStatistics;
use mmreco::{AxisReconstruction, Config, Observer, Reconstructor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

// Neighbour bands for distances 1, 2 and 3 from the peak strip.
const LIMITS: &str = "20 95\n5 80\n0 60\n";
const TIME_SLICES: usize = 27;

#[derive(Default)]
struct HitMap {
    hits: Vec<(u32, u32)>,
    cluster_sizes: AxisPair<Vec<usize>>,
}

impl Observer for HitMap {
    type Charge = i16;

    fn on_reconstructed(
        &mut self,
        _event: &Event<i16>,
        reconstruction: &AxisReconstruction<'_, i16>,
    ) {
        if reconstruction.accepted() {
            self.cluster_sizes[reconstruction.axis].push(reconstruction.cluster.size());
        }
    }

    fn on_coincidence(
        &mut self,
        _event: &Event<i16>,
        x: &AxisReconstruction<'_, i16>,
        y: &AxisReconstruction<'_, i16>,
    ) {
        if x.accepted() && y.accepted() {
            self.hits.push((x.peak.strip, y.peak.strip));
        }
    }
}

fn axis_strips<R: Rng>(rng: &mut R, channels: [u32; 3], t0: f64) -> Result<Vec<StripSample<i16>>> {
    let noise = Normal::new(0.0, 4.0)?;
    let centre: i64 = rng.random_range(4..357);
    let amplitude = rng.random_range(80.0..900.0);
    let sigma = rng.random_range(0.6..2.0);

    let mut strips = Vec::new();
    for strip in (centre - 6)..=(centre + 6) {
        let Ok(strip) = u32::try_from(strip) else {
            continue;
        };
        if !(1..=360).contains(&strip) {
            continue;
        }
        let d = (i64::from(strip) - centre) as f64;
        let charge = amplitude * (-d * d / (2.0 * sigma * sigma)).exp();
        let samples: Vec<i16> = (0..TIME_SLICES)
            .map(|t| {
                let dt = t as f64 - t0;
                let q = charge * (-dt * dt / 8.0).exp() + noise.sample(&mut *rng);
                q.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
            })
            .collect();

        // Zero suppression, plus the odd dead channel.
        if samples.iter().all(|&q| q <= 8) || rng.random_bool(0.02) {
            continue;
        }
        let channel = channels[((strip - 1) / 120).min(2) as usize];
        strips.push(StripSample::from_samples(channel, strip, samples));
    }

    Ok(strips)
}

fn synthetic_event<R: Rng>(rng: &mut R, number: u64) -> Result<Event<i16>> {
    let t0 = rng.random_range(6.0..20.0);
    let mut strips = axis_strips(rng, [5, 4, 6], t0)?;
    if rng.random_bool(0.9) {
        let jitter = rng.random_range(-1.0..1.0);
        strips.extend(axis_strips(rng, [0, 1, 2], t0 + jitter)?);
    }

    let timestamp = Timestamp::new(
        1_700_000_000 + (number / 10) as i64,
        (number % 10) as u32 * 100_000,
    );
    Ok(Event::new(number, timestamp, strips))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut rng = StdRng::seed_from_u64(2024);
    let events = (0..5000)
        .map(|n| synthetic_event(&mut rng, n))
        .collect::<Result<Vec<_>>>()?;

    let config = Config::builder()
        .limits(LIMITS.parse::<ProportionLimits>()?)
        .min_charge(AxisPair::splat(40i16))
        .time_slices(TIME_SLICES)
        .build()?;

    let (stats, hit_map) = Reconstructor::builder()
        .config(config)
        .observer((CutStatistics::new(), HitMap::default()))
        .build()
        .run(events);

    println!("{}", serde_json::to_string_pretty(&stats)?);
    for axis in Axis::ALL {
        let sizes = &hit_map.cluster_sizes[axis];
        let mean = sizes.iter().sum::<usize>() as f64 / sizes.len().max(1) as f64;
        println!(
            "{axis}: acceptance {:.3}, mean cluster size {mean:.2}",
            stats.axes[axis].acceptance().unwrap_or(0.0)
        );
    }
    println!("first accepted hits (x, y): {:?}", &hit_map.hits[..hit_map.hits.len().min(10)]);

    Ok(())
}
