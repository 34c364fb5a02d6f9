// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Mutex;

use kermesse_domain::{Stand, StandCategory, Tombola, User, UserRole};
use kermesse_persistence::Persistence;

use crate::handlers::{kermesses, stands, tombolas, users};
use crate::{
    AuthenticatedActor, CreateKermesseRequest, CreateStandRequest, CreateTombolaRequest,
    InviteChildRequest, LinkStandRequest, LinkUserRequest, NotificationSink, RegisterRequest,
    TopUpRequest,
};

pub const TEST_PASSWORD: &str = "Kermesse-2026";

/// Notification sink that keeps every message it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(i64, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, organizer_id: i64, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((organizer_id, message.to_string()));
    }
}

pub fn register_actor(
    persistence: &mut Persistence,
    name: &str,
    email: &str,
    role: UserRole,
) -> AuthenticatedActor {
    let user: User = users::register(
        persistence,
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            role,
        },
    )
    .expect("Failed to register user");
    AuthenticatedActor::new(user.user_id, user.role)
}

pub fn invite_student(
    persistence: &mut Persistence,
    parent: &AuthenticatedActor,
    name: &str,
    email: &str,
) -> AuthenticatedActor {
    let response = users::invite_child(
        persistence,
        parent,
        InviteChildRequest {
            name: name.to_string(),
            email: email.to_string(),
        },
    )
    .expect("Failed to invite student");
    AuthenticatedActor::new(response.student.user_id, UserRole::Student)
}

pub fn fund(persistence: &mut Persistence, user_id: i64, amount: u64, reference: &str) {
    users::top_up(
        persistence,
        &TopUpRequest {
            user_id,
            amount,
            reference: reference.to_string(),
        },
    )
    .expect("Failed to top up");
}

pub fn balance_of(persistence: &mut Persistence, user_id: i64) -> u64 {
    persistence
        .read(|tx| tx.get_user(user_id))
        .expect("Failed to read user")
        .expect("User not found")
        .balance
}

pub fn open_stand(
    persistence: &mut Persistence,
    holder: &AuthenticatedActor,
    category: StandCategory,
    price: u64,
    stock: u64,
) -> Stand {
    stands::create_stand(
        persistence,
        holder,
        CreateStandRequest {
            name: format!("{category} stand"),
            description: String::new(),
            category,
            price,
            stock,
        },
    )
    .expect("Failed to create stand")
}

pub fn open_tombola(
    persistence: &mut Persistence,
    organizer: &AuthenticatedActor,
    kermesse_id: i64,
    price: u64,
) -> Tombola {
    tombolas::create_tombola(
        persistence,
        organizer,
        CreateTombolaRequest {
            kermesse_id,
            name: String::from("Grand tombola"),
            prize: String::from("Bicycle"),
            price,
        },
    )
    .expect("Failed to create tombola")
}

/// A running kermesse with one linked stand and one enrolled family.
pub struct Fair {
    pub persistence: Persistence,
    pub organizer: AuthenticatedActor,
    pub holder: AuthenticatedActor,
    pub parent: AuthenticatedActor,
    pub student: AuthenticatedActor,
    pub kermesse_id: i64,
    pub stand: Stand,
}

/// Builds a [`Fair`] around a stand of the given shape.
///
/// The parent holds 100 tokens, the student none.
pub fn setup_fair_with_stand(category: StandCategory, price: u64, stock: u64) -> Fair {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create persistence");
    setup_fair_in(persistence, category, price, stock)
}

/// Same as [`setup_fair_with_stand`], in the given store.
pub fn setup_fair_in(
    mut persistence: Persistence,
    category: StandCategory,
    price: u64,
    stock: u64,
) -> Fair {

    let organizer = register_actor(
        &mut persistence,
        "Olivia Organizer",
        "olivia@school.test",
        UserRole::Organizer,
    );
    let holder = register_actor(
        &mut persistence,
        "Hugo Holder",
        "hugo@school.test",
        UserRole::StandHolder,
    );
    let parent = register_actor(
        &mut persistence,
        "Paula Parent",
        "paula@school.test",
        UserRole::Parent,
    );
    let student = invite_student(&mut persistence, &parent, "Sam Student", "sam@school.test");
    fund(&mut persistence, parent.id, 100, "pay-parent-1");

    let kermesse = kermesses::create_kermesse(
        &mut persistence,
        &organizer,
        CreateKermesseRequest {
            name: String::from("Spring fair"),
            description: String::from("Playground"),
        },
    )
    .expect("Failed to create kermesse");

    let stand: Stand = open_stand(&mut persistence, &holder, category, price, stock);
    kermesses::link_stand(
        &mut persistence,
        &organizer,
        kermesse.kermesse_id,
        LinkStandRequest {
            stand_id: stand.stand_id,
        },
    )
    .expect("Failed to link stand");
    kermesses::link_user(
        &mut persistence,
        &organizer,
        kermesse.kermesse_id,
        LinkUserRequest {
            user_id: student.id,
        },
    )
    .expect("Failed to link student");

    Fair {
        persistence,
        organizer,
        holder,
        parent,
        student,
        kermesse_id: kermesse.kermesse_id,
        stand,
    }
}

/// A fair around a food stand priced 30 with 2 units in stock.
pub fn setup_fair() -> Fair {
    setup_fair_with_stand(StandCategory::Food, 30, 2)
}
