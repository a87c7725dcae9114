use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt};

/// Default reporting threshold in microseconds when `#[profile]` has no argument.
const DEFAULT_THRESHOLD_US: u128 = 1000;

/// Time a navigation call when the `perf_stats` feature is enabled.
///
/// Wraps the function body in a drop guard that measures wall time and logs
/// `[PERF] <fn>: <elapsed>` through `bevy::log::info!` when the call took longer
/// than the threshold. Without `perf_stats` the guard is never compiled in.
///
/// # Example
/// ```ignore
/// #[profile(500)] // report searches slower than 500µs
/// pub fn find_path(grid: &NavGrid, start: Point, goal: Point, mask: Passability) -> Option<Path> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_us = if attr.is_empty() {
        DEFAULT_THRESHOLD_US
    } else {
        let lit = parse_macro_input!(attr as LitInt);
        match lit.base10_parse::<u128>() {
            Ok(value) => value,
            Err(err) => return err.to_compile_error().into(),
        }
    };

    expand(input, threshold_us).into()
}

fn expand(input: ItemFn, threshold_us: u128) -> TokenStream2 {
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_micros() > #threshold_us {
                            bevy::log::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name_str,
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    }
}
