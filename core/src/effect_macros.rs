//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce the `Box::pin` boilerplate when building `Effect`
//! variants inside [`Reactor::mutate`](crate::reactor::Reactor::mutate).

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use reactorkit_core::async_effect;
///
/// async_effect! {
///     let receipt = service.submit(text).await;
///     Some(PostMutation::SetSubmitting(false))
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Stream` from any `Stream` of mutations
///
/// # Example
///
/// ```rust,ignore
/// use reactorkit_core::stream_effect;
///
/// stream_effect!(futures::stream::iter(vec![Mutation::A, Mutation::B]))
/// ```
#[macro_export]
macro_rules! stream_effect {
    ($stream:expr) => {
        $crate::effect::Effect::Stream(::std::boxed::Box::pin($stream))
    };
}

/// Create an `Effect::Delay` for scheduling delayed mutations
///
/// # Example
///
/// ```rust,ignore
/// use reactorkit_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(1),
///     mutation: PostMutation::SetSubmitting(false)
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        mutation: $mutation:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            mutation: ::std::boxed::Box::new($mutation),
        }
    };
}
