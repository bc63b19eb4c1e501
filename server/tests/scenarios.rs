use std::collections::VecDeque;
use std::sync::Arc;

use pixelroom_server::allocator::Allocate;
use pixelroom_server::connection::ConnectionEvent;
use pixelroom_server::outbox::{ConnectionTx, Outbox, OutboxLimits};
use pixelroom_server::server_state::ServerState;
use system::euclid::default::Point2D;
use system::{
    Color, Participant, ParticipantId, ServerMessage, Stroke, StrokeEvent, VideoFrameEvent,
    Welcome,
};

fn scripted(identities: &[(&str, &str)]) -> impl Allocate {
    let mut queue: VecDeque<(ParticipantId, Color)> = identities
        .iter()
        .map(|(id, color)| (ParticipantId::new(*id), color.parse().expect("")))
        .collect();
    move || queue.pop_front().expect("ran out of scripted identities")
}

fn outbox() -> ConnectionTx {
    Arc::new(Outbox::new(OutboxLimits::default()))
}

fn messages(tx: &ConnectionTx) -> Vec<ServerMessage> {
    std::iter::from_fn(|| tx.try_recv())
        .filter_map(|event| match event {
            ConnectionEvent::Message(message) => Some(message),
            _ => None,
        })
        .collect()
}

fn participant(id: &str, color: &str) -> Participant {
    Participant::new(ParticipantId::new(id), color.parse().expect(""))
}

#[test]
fn room_walkthrough() {
    let mut state = ServerState::new(scripted(&[("A1", "#112233"), ("B1", "#445566")]));
    let a1 = participant("A1", "#112233");
    let b1 = participant("B1", "#445566");

    // A connects alone.
    let a = outbox();
    state.connect(1, a.clone()).expect("");
    assert!(matches!(
        a.try_recv(),
        Some(ConnectionEvent::Connected { connection_id: 1 })
    ));
    assert_eq!(
        messages(&a),
        vec![
            ServerMessage::Welcome(Welcome::new(&a1)),
            ServerMessage::CurrentUsers(vec![]),
        ]
    );

    // B connects while A is active.
    let b = outbox();
    state.connect(2, b.clone()).expect("");
    assert_eq!(
        messages(&b),
        vec![
            ServerMessage::Welcome(Welcome::new(&b1)),
            ServerMessage::CurrentUsers(vec![a1.clone()]),
        ]
    );
    assert_eq!(messages(&a), vec![ServerMessage::UserJoined(b1.clone())]);

    // A draws (0,0) -> (10,10).
    let stroke = Stroke::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0));
    state.relay_draw_stroke(&1, stroke).expect("");
    assert_eq!(
        messages(&b),
        vec![ServerMessage::Drawed(StrokeEvent::new(&stroke, &a1))]
    );
    assert!(messages(&a).is_empty());

    // A disconnects.
    assert_eq!(state.disconnect(&1), Some(a1));
    assert_eq!(
        messages(&b),
        vec![ServerMessage::UserLeft(ParticipantId::new("A1"))]
    );
    assert_eq!(state.registry().snapshot(None), vec![b1]);

    // B sends a video frame with nobody else around.
    let fan_out = state.relay_video_frame(&2, "P".into()).expect("");
    assert_eq!(fan_out.recipients, 0);
    assert!(messages(&b).is_empty());
}

#[test]
fn registry_size_tracks_connects_minus_disconnects() {
    let mut next = 0u32;
    let mut state = ServerState::new(move || {
        next += 1;
        (ParticipantId::new(format!("{:08x}", next)), Color::default())
    });

    let mut expected = 0;
    for round in 0..4u32 {
        for n in 0..3 {
            state.connect(round * 10 + n, outbox()).expect("");
            expected += 1;
        }
        state.disconnect(&(round * 10));
        state.disconnect(&(round * 10));
        expected -= 1;
        assert_eq!(state.registry().snapshot(None).len(), expected);
    }
}

#[test]
fn joins_reach_everyone_already_present() {
    let mut state = ServerState::new(scripted(&[
        ("A1", "#000001"),
        ("B1", "#000002"),
        ("C1", "#000003"),
    ]));
    let a = outbox();
    let b = outbox();
    let c = outbox();
    state.connect(1, a.clone()).expect("");
    state.connect(2, b.clone()).expect("");
    messages(&a);
    messages(&b);

    state.connect(3, c.clone()).expect("");
    let joined = ServerMessage::UserJoined(participant("C1", "#000003"));
    assert_eq!(messages(&a), vec![joined.clone()]);
    assert_eq!(messages(&b), vec![joined.clone()]);

    let received = messages(&c);
    assert!(!received.contains(&joined));
    assert_eq!(
        received[1],
        ServerMessage::CurrentUsers(vec![participant("A1", "#000001"), participant("B1", "#000002")])
    );
}

#[test]
fn strokes_from_one_sender_arrive_in_order() {
    let mut state = ServerState::new(scripted(&[("A1", "#112233"), ("B1", "#445566")]));
    let b = outbox();
    state.connect(1, outbox()).expect("");
    state.connect(2, b.clone()).expect("");
    messages(&b);

    for n in 0..20 {
        let x = n as f64;
        state
            .relay_draw_stroke(&1, Stroke::new(Point2D::new(x, 0.0), Point2D::new(x + 1.0, 0.0)))
            .expect("");
        state.relay_video_frame(&1, format!("frame-{}", n)).expect("");
    }

    let starts: Vec<f64> = messages(&b)
        .into_iter()
        .filter_map(|message| match message {
            ServerMessage::Drawed(event) => Some(event.startx),
            _ => None,
        })
        .collect();
    assert_eq!(starts, (0..20).map(|n| n as f64).collect::<Vec<_>>());
}

#[test]
fn frames_are_tagged_with_the_sender() {
    let mut state = ServerState::new(scripted(&[("A1", "#112233"), ("B1", "#445566")]));
    let a = outbox();
    state.connect(1, a.clone()).expect("");
    state.connect(2, outbox()).expect("");
    messages(&a);

    state.relay_video_frame(&2, "data:image/png;base64,AA==".into()).expect("");
    assert_eq!(
        messages(&a),
        vec![ServerMessage::VideoData(VideoFrameEvent {
            sender: ParticipantId::new("B1"),
            video_data: "data:image/png;base64,AA==".into(),
            color: "#445566".parse().expect(""),
        })]
    );
}

#[test]
fn leaves_reach_everyone_still_present() {
    let mut state = ServerState::new(scripted(&[
        ("A1", "#000001"),
        ("B1", "#000002"),
        ("C1", "#000003"),
        ("D1", "#000004"),
    ]));
    let outboxes: Vec<ConnectionTx> = (0..4).map(|_| outbox()).collect();
    for (n, tx) in outboxes.iter().enumerate() {
        state.connect(n as u32 + 1, tx.clone()).expect("");
    }
    for tx in &outboxes {
        messages(tx);
    }

    state.disconnect(&2).expect("");
    let left = ServerMessage::UserLeft(ParticipantId::new("B1"));
    for n in [0, 2, 3] {
        assert_eq!(messages(&outboxes[n]), vec![left.clone()]);
    }
    assert!(messages(&outboxes[1]).is_empty());
    assert!(!state
        .registry()
        .contains_participant(&ParticipantId::new("B1")));
    assert_eq!(state.registry().len(), 3);
}
