// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod draw;
mod lifecycle;
mod purchase;
mod validation;

use crate::{Kermesse, LifecycleStatus, Stand, StandCategory, Tombola, User, UserRole};

pub fn make_user(user_id: i64, role: UserRole, balance: u64) -> User {
    User {
        user_id,
        parent_id: None,
        name: format!("User {user_id}"),
        email: format!("user{user_id}@example.com"),
        role,
        balance,
    }
}

pub fn make_kermesse(kermesse_id: i64, organizer_id: i64, status: LifecycleStatus) -> Kermesse {
    Kermesse {
        kermesse_id,
        organizer_id,
        name: String::from("Spring Fair"),
        description: String::from("Annual school fair"),
        status,
    }
}

pub fn make_stand(
    stand_id: i64,
    holder_id: i64,
    category: StandCategory,
    price: u64,
    stock: u64,
) -> Stand {
    Stand {
        stand_id,
        holder_id,
        name: String::from("Crepes"),
        description: String::new(),
        category,
        price,
        stock,
    }
}

pub fn make_tombola(
    tombola_id: i64,
    kermesse_id: i64,
    price: u64,
    status: LifecycleStatus,
) -> Tombola {
    Tombola {
        tombola_id,
        kermesse_id,
        name: String::from("Big Raffle"),
        prize: String::from("Bicycle"),
        price,
        status,
    }
}
