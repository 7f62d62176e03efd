//! RT-safe note events delivered to the render callback.

use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};

/// What a render block does with an incoming event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteAction {
    On { note: u8, velocity: u8 },
    Off { note: u8 },
}

/// Channel voice message stamped with its frame offset inside the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    /// Offset within the current buffer (0 = first sample).
    pub frame_offset: usize,
    pub channel: Channel,
    pub msg: ChannelVoiceMsg,
}

impl MidiEvent {
    #[inline]
    pub fn new(frame_offset: usize, channel: Channel, msg: ChannelVoiceMsg) -> Self {
        Self {
            frame_offset,
            channel,
            msg,
        }
    }

    #[inline]
    pub fn note_on(frame_offset: usize, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            frame_offset,
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::NoteOn { note, velocity },
        }
    }

    #[inline]
    pub fn note_off(frame_offset: usize, channel: u8, note: u8) -> Self {
        Self {
            frame_offset,
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::NoteOff { note, velocity: 0 },
        }
    }

    #[inline]
    pub fn channel_num(&self) -> u8 {
        self.channel as u8
    }

    /// Note-on with velocity 0 counts as a note-off. Anything that is not a
    /// note message yields `None`.
    #[inline]
    pub fn action(&self) -> Option<NoteAction> {
        match self.msg {
            ChannelVoiceMsg::NoteOn { note, velocity: 0 }
            | ChannelVoiceMsg::NoteOff { note, .. } => Some(NoteAction::Off { note }),
            ChannelVoiceMsg::NoteOn { note, velocity } => Some(NoteAction::On { note, velocity }),
            _ => None,
        }
    }

    /// Parse a raw channel voice message (e.g. from a host MIDI buffer).
    pub fn from_bytes(bytes: &[u8], frame_offset: usize) -> Result<Self, midi_msg::ParseError> {
        let (msg, _len) = MidiMsg::from_midi(bytes)?;
        match msg {
            MidiMsg::ChannelVoice { channel, msg } => Ok(Self {
                frame_offset,
                channel,
                msg,
            }),
            _ => Err(midi_msg::ParseError::Invalid(
                "Expected ChannelVoice message",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_action() {
        let event = MidiEvent::note_on(100, 0, 60, 100);
        assert_eq!(
            event.action(),
            Some(NoteAction::On {
                note: 60,
                velocity: 100
            })
        );
        assert_eq!(event.frame_offset, 100);
    }

    #[test]
    fn test_zero_velocity_note_on_is_off() {
        let event = MidiEvent::note_on(0, 2, 60, 0);
        assert_eq!(event.action(), Some(NoteAction::Off { note: 60 }));
        assert_eq!(event.channel_num(), 2);
    }

    #[test]
    fn test_from_bytes() {
        let event = MidiEvent::from_bytes(&[0x80, 38, 0], 7).unwrap();
        assert_eq!(event.action(), Some(NoteAction::Off { note: 38 }));
        assert_eq!(event.frame_offset, 7);
    }

    #[test]
    fn test_non_note_message_has_no_action() {
        let event = MidiEvent::new(
            0,
            Channel::Ch1,
            ChannelVoiceMsg::ChannelPressure { pressure: 10 },
        );
        assert_eq!(event.action(), None);
    }
}
