// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Cooperative cancellation shared by the runner and every pipeline.

use tokio::sync::watch;

/// Owner side: flips the shared flag.
#[derive(Debug,)]
pub struct CancelHandle
{
    sender: watch::Sender<bool,>,
}

/// Observer side: cheap to clone, checked at stage boundaries.
#[derive(Debug, Clone,)]
pub struct CancelToken
{
    receiver: watch::Receiver<bool,>,
}

/// Creates a connected handle/token pair.
pub fn cancellation() -> (CancelHandle, CancelToken,)
{
    let (sender, receiver,) = watch::channel(false,);
    (
        CancelHandle {
            sender,
        },
        CancelToken {
            receiver,
        },
    )
}

impl CancelHandle
{
    /// Requests cancellation. Idempotent.
    pub fn cancel(&self,)
    {
        self.sender.send_replace(true,);
    }

    pub fn token(&self,) -> CancelToken
    {
        CancelToken {
            receiver: self.sender.subscribe(),
        }
    }
}

impl CancelToken
{
    /// Token that is never cancelled.
    pub fn never() -> Self
    {
        cancellation().1
    }

    pub fn is_cancelled(&self,) -> bool
    {
        *self.receiver.borrow()
    }
}
