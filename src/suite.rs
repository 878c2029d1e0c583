//! The standard set of LHE primitive benchmarks.

use crate::bench::{CaseContext, CaseRegistry, Isolation};
use crate::error::Result;
use crate::scheme::{LheScheme, SchemeProvider};
use crate::storage::TableStorage;

/// Left operand of every binary case.
pub const LHS: i64 = 555555;
/// Right operand of every binary case.
pub const RHS: i64 = 111111;
/// Plaintext factor of `hom_mul`.
pub const SCALAR: i64 = 3;

/// Iterations for one-shot, expensive cases.
pub const ONE_SHOT: u64 = 1;
/// Iterations for cheap, repeatable cases.
pub const REPEATED: u64 = 1000;

fn load_into<S: LheScheme>(scheme: &mut S, storage: &dyn TableStorage) -> Result<()> {
    let mut reader = storage.open()?;
    scheme.load_table(&mut reader)
}

fn keyed<P: SchemeProvider>(provider: &P) -> Result<P::Scheme> {
    let mut scheme = provider.instantiate();
    scheme.key_gen();
    Ok(scheme)
}

/// Register every primitive of the scheme, in the order they are reported.
pub fn standard_cases<P>() -> CaseRegistry<P>
where
    P: SchemeProvider + 'static,
{
    let mut registry: CaseRegistry<P> = CaseRegistry::new();
    registry
        .register("load_table", ONE_SHOT, Isolation::Whole, |b, ctx| {
            b.iter(|| {
                let mut scheme = ctx.provider.instantiate();
                load_into(&mut scheme, ctx.storage)?;
                Ok(scheme)
            })
        })
        .register("key_gen", REPEATED, Isolation::Whole, |b, ctx| {
            b.iter(|| keyed(ctx.provider))
        })
        .register("encrypt", REPEATED, Isolation::PerIteration, |b, ctx| {
            b.iter_isolated(|| keyed(ctx.provider), |scheme| scheme.encrypt(LHS))
        })
        .register("decrypt", ONE_SHOT, Isolation::SharedState, decrypt_case)
        .register("hom_add", REPEATED, Isolation::PerIteration, |b, ctx| {
            b.iter_isolated(
                || ciphertext_pair(ctx),
                |(scheme, lhs, rhs)| Ok(scheme.hom_add(lhs, rhs)),
            )
        })
        .register("hom_add_plain", REPEATED, Isolation::PerIteration, |b, ctx| {
            b.iter_isolated(
                || ciphertext_and_plaintext(ctx, RHS),
                |(scheme, ct, pt)| Ok(scheme.hom_add_plain(ct, pt)),
            )
        })
        .register("hom_sub", REPEATED, Isolation::PerIteration, |b, ctx| {
            b.iter_isolated(
                || ciphertext_pair(ctx),
                |(scheme, lhs, rhs)| Ok(scheme.hom_sub(rhs, lhs)),
            )
        })
        .register("hom_sub_plain", REPEATED, Isolation::PerIteration, |b, ctx| {
            b.iter_isolated(
                || ciphertext_and_plaintext(ctx, RHS),
                |(scheme, ct, pt)| Ok(scheme.hom_sub_plain(ct, pt)),
            )
        })
        .register("hom_mul", REPEATED, Isolation::PerIteration, |b, ctx| {
            b.iter_isolated(
                || ciphertext_and_plaintext(ctx, SCALAR),
                |(scheme, ct, pt)| Ok(scheme.hom_mul(ct, pt)),
            )
        })
        .register("hom_negate", REPEATED, Isolation::PerIteration, |b, ctx| {
            b.iter_isolated(
                || {
                    let scheme = keyed(ctx.provider)?;
                    let ct = scheme.encrypt(LHS)?;
                    Ok((scheme, ct))
                },
                |(scheme, ct)| Ok(scheme.hom_negate(ct)),
            )
        });
    registry
}

type Scheme<P> = <P as SchemeProvider>::Scheme;
type Ct<P> = <Scheme<P> as LheScheme>::Ciphertext;
type Pt<P> = <Scheme<P> as LheScheme>::Plaintext;

// The table is loaded once, outside the loop; only the decrypt call is timed.
fn decrypt_case<P: SchemeProvider>(
    b: &mut crate::bench::Bencher<'_>,
    ctx: &CaseContext<'_, P>,
) -> Result<()> {
    let mut scheme = ctx.provider.instantiate();
    load_into(&mut scheme, ctx.storage)?;
    b.iter_with_state(
        &mut scheme,
        |scheme| {
            scheme.key_gen();
            scheme.encrypt(LHS)
        },
        |scheme, ct| scheme.decrypt(ct),
    )
}

fn ciphertext_pair<P: SchemeProvider>(
    ctx: &CaseContext<'_, P>,
) -> Result<(Scheme<P>, Ct<P>, Ct<P>)> {
    let scheme = keyed(ctx.provider)?;
    let lhs = scheme.encrypt(LHS)?;
    let rhs = scheme.encrypt(RHS)?;
    Ok((scheme, lhs, rhs))
}

fn ciphertext_and_plaintext<P: SchemeProvider>(
    ctx: &CaseContext<'_, P>,
    plain: i64,
) -> Result<(Scheme<P>, Ct<P>, Pt<P>)> {
    let scheme = keyed(ctx.provider)?;
    let ct = scheme.encrypt(LHS)?;
    let pt = scheme.encode(plain);
    Ok((scheme, ct, pt))
}
