/// Procedural sound effects via rodio.
///
/// Every effect is synthesized once at startup into an in-memory WAV buffer
/// and replayed on a detached Sink. Without the "sound" feature the engine is
/// a no-op stub with the same API.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        jump: Arc<Vec<u8>>,
        dash: Arc<Vec<u8>>,
        hurt: Arc<Vec<u8>>,
        explosion: Arc<Vec<u8>>,
        goal: Arc<Vec<u8>>,
        game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("sound: no output device: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                jump: Arc::new(encode_wav(&sweep(320.0, 720.0, 0.09, 0.22))),
                dash: Arc::new(encode_wav(&dash_whoosh())),
                hurt: Arc::new(encode_wav(&sweep(480.0, 140.0, 0.18, 0.3))),
                explosion: Arc::new(encode_wav(&rumble())),
                goal: Arc::new(encode_wav(&notes(&[523.0, 659.0, 784.0, 1047.0], 0.09, 0.28))),
                game_over: Arc::new(encode_wav(&notes(&[392.0, 330.0, 262.0, 196.0], 0.16, 0.3))),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_jump(&self) { self.play(&self.jump); }
        pub fn play_dash(&self) { self.play(&self.dash); }
        pub fn play_hurt(&self) { self.play(&self.hurt); }
        pub fn play_explosion(&self) { self.play(&self.explosion); }
        pub fn play_goal(&self) { self.play(&self.goal); }
        pub fn play_game_over(&self) { self.play(&self.game_over); }
    }

    fn sample_count(secs: f32) -> usize {
        (SAMPLE_RATE as f32 * secs) as usize
    }

    /// Sine glide from `from` Hz to `to` Hz with a linear fade.
    fn sweep(from: f32, to: f32, secs: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(secs);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Sequence of square-ish tones, each fading slightly.
    fn notes(freqs: &[f32], note_secs: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(note_secs);
        let mut out = Vec::with_capacity(n * freqs.len());
        for (k, &freq) in freqs.iter().enumerate() {
            let last = k + 1 == freqs.len();
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let fade = if last { 1.0 - i as f32 / n as f32 } else { 1.0 - 0.25 * i as f32 / n as f32 };
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 3.0 * TAU).sin() * 0.25;
                out.push(wave * fade * volume);
            }
        }
        out
    }

    /// Deterministic white noise.
    fn noise(n: usize, mut state: u32) -> impl Iterator<Item = f32> {
        (0..n).map(move |_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as f32 / u32::MAX as f32 * 2.0 - 1.0
        })
    }

    /// Short filtered noise burst.
    fn dash_whoosh() -> Vec<f32> {
        let n = sample_count(0.14);
        let mut smooth = 0.0_f32;
        noise(n, 0x9e37_79b9)
            .enumerate()
            .map(|(i, s)| {
                let t = i as f32 / n as f32;
                smooth += (s - smooth) * (0.15 + 0.5 * t);
                let env = (t * 6.0).min(1.0) * (1.0 - t);
                smooth * env * 0.5
            })
            .collect()
    }

    /// Low noise rumble over a falling tone.
    fn rumble() -> Vec<f32> {
        let n = sample_count(0.45);
        let mut smooth = 0.0_f32;
        let mut phase = 0.0_f32;
        noise(n, 0x2545_f491)
            .enumerate()
            .map(|(i, s)| {
                let t = i as f32 / n as f32;
                smooth += (s - smooth) * 0.08;
                phase += (110.0 - 70.0 * t) / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(1.6);
                (smooth * 0.8 + (phase * TAU).sin() * 0.35) * env * 0.45
            })
            .collect()
    }

    /// 16-bit mono PCM WAV.
    fn encode_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * u32::from(block_align);
        let data_len = samples.len() as u32 * u32::from(block_align);

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_dash(&self) {}
    pub fn play_hurt(&self) {}
    pub fn play_explosion(&self) {}
    pub fn play_goal(&self) {}
    pub fn play_game_over(&self) {}
}
