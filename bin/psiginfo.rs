fn main() {
    psygnal::psiginfo_main()
}
